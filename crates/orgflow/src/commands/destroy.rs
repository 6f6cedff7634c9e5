use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CancellationToken, OperationContext};

pub async fn handle(
    workspace: &Workspace,
    target: Option<&str>,
    yes: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    println!("{}", "リソースを削除します...".blue().bold());

    let lock = workspace.state.acquire_lock().await?;
    let mut global = workspace.state.load().await?;

    // 削除対象: (provider, type:name)
    let mut targets = Vec::new();
    match target {
        Some(address) => {
            let (resource_type, name) = utils::parse_address(address)?;
            let provider = workspace.providers.for_resource_type(&resource_type)?;
            let key = utils::state_key(provider.name(), &resource_type, &name);
            if global.get_resource(&key).is_none() {
                lock.release().await?;
                return Err(anyhow::anyhow!("{} はステートにありません", address));
            }
            targets.push((provider, utils::resource_key(&resource_type, &name)));
        }
        None => {
            for provider in workspace.providers.iter() {
                for key in global.provider_state(provider.name()).keys() {
                    targets.push((provider.clone(), key));
                }
            }
        }
    }

    if targets.is_empty() {
        lock.release().await?;
        println!("{}", "削除対象のリソースはありません".yellow());
        return Ok(());
    }

    println!();
    println!("{}", format!("削除対象 ({} 個):", targets.len()).bold());
    for (provider, key) in &targets {
        let key = format!("{}:{}", provider.name(), key);
        let id = global
            .get_resource(&key)
            .map(|r| r.id.as_str())
            .unwrap_or("-");
        println!("  {} {} ({})", "-".red(), utils::display_address(&key).cyan(), id);
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        lock.release().await?;
        println!();
        println!("{}", "警告: 上記の組織をリモートから削除します。".yellow());
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    let ctx = OperationContext::with_cancel(cancel);
    let mut failures = Vec::new();

    for (provider, key) in &targets {
        let address = utils::display_address(&format!("{}:{}", provider.name(), key));
        let mut state = global.provider_state(provider.name());

        match provider.destroy(key, &mut state, &ctx).await {
            Ok(()) => {
                global.replace_provider_state(provider.name(), state);
                workspace.state.save(&global).await?;
                println!("  {} {} を削除しました", "✓".green(), address.cyan());
            }
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), address, e);
                failures.push(address);
            }
        }
    }

    lock.release().await?;

    if !failures.is_empty() {
        return Err(anyhow::anyhow!(
            "削除に失敗しました: {}",
            failures.join(", ")
        ));
    }
    println!();
    println!("{}", "✓ 削除が完了しました".green().bold());
    Ok(())
}
