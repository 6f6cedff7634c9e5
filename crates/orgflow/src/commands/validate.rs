use colored::Colorize;

pub async fn handle() -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let path = match orgflow_config::find_config_file() {
        Ok(path) => path,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定ファイルが見つかりません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    println!("設定ファイル: {}", path.display().to_string().cyan());

    let config = match orgflow_config::parse_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    // プロバイダー側の検証 (alias 必須など) も通す
    let desired = crate::workspace::resource_set(&config);
    for resource in desired.iter() {
        if let Err(e) = orgflow_cloud_workmail::OrganizationModel::from_resource_config(resource) {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    let region = config.provider.region.as_deref().unwrap_or("(AWS 既定)");
    println!(
        "  プロバイダー: {} (region: {})",
        config.provider.name.cyan(),
        region
    );
    println!("  組織: {}個", config.organizations.len());
    for org in &config.organizations {
        let description = org.description.as_deref().unwrap_or("(説明なし)");
        println!(
            "    - {} (alias: {}, {})",
            org.name.cyan(),
            org.alias,
            description
        );
    }

    Ok(())
}
