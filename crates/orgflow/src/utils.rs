use colored::Colorize;
use orgflow_cloud::{ActionType, ApplyResult, Plan};

/// `workmail_organization.main` を (type, name) に分解
pub fn parse_address(address: &str) -> anyhow::Result<(String, String)> {
    match address.split_once('.') {
        Some((resource_type, name)) if !resource_type.is_empty() && !name.is_empty() => {
            Ok((resource_type.to_string(), name.to_string()))
        }
        _ => Err(anyhow::anyhow!(
            "不正なリソースアドレス: {} (例: workmail_organization.main)",
            address
        )),
    }
}

/// プロバイダー内のリソースキー (type:name)
pub fn resource_key(resource_type: &str, name: &str) -> String {
    format!("{}:{}", resource_type, name)
}

/// ステートファイル全体でのキー (provider:type:name)
pub fn state_key(provider: &str, resource_type: &str, name: &str) -> String {
    format!("{}:{}", provider, resource_key(resource_type, name))
}

/// ステートのキーを表示用のアドレスに変換
pub fn display_address(state_key: &str) -> String {
    let local = state_key.split_once(':').map(|(_, l)| l).unwrap_or(state_key);
    local.replacen(':', ".", 1)
}

/// 変更計画を表示
pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let address = action.resource_key.replacen(':', ".", 1);
        let line = match action.action_type {
            ActionType::Create => format!("  + {}", address).green(),
            ActionType::Update => format!("  ~ {}", address).yellow(),
            ActionType::Replace => format!("-/+ {}", address).magenta(),
            ActionType::Delete => format!("  - {}", address).red(),
            ActionType::NoOp => continue,
        };
        println!("{}", line);
        println!("      {}", action.description.dimmed());

        let mut attributes: Vec<_> = action.details.iter().collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));
        for (attribute, change) in attributes {
            println!(
                "      {}: {} → {}",
                attribute,
                change["old"].to_string().dimmed(),
                change["new"].to_string().cyan()
            );
        }
    }

    println!();
    println!("{}: {}", "Plan".bold(), plan.summary());
}

/// 適用結果を表示
pub fn print_apply_result(result: &ApplyResult) {
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.action_id,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "{} 成功, {} 失敗 ({:.1}秒)",
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms as f64 / 1000.0
    );
}
