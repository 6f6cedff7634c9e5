use super::plan::plan_all;
use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CancellationToken, OperationContext};

pub async fn handle(workspace: &Workspace, yes: bool, cancel: CancellationToken) -> anyhow::Result<()> {
    println!("{}", "変更を適用します...".blue().bold());

    let lock = workspace.state.acquire_lock().await?;
    let mut global = workspace.state.load().await?;
    let plans = plan_all(workspace, &global).await?;

    if plans.iter().all(|(_, plan)| !plan.has_changes) {
        lock.release().await?;
        println!("{}", "✓ 変更はありません".green());
        return Ok(());
    }

    for (provider, plan) in &plans {
        if plan.has_changes {
            println!("{}", format!("【{}】", provider.display_name()).bold());
            utils::print_plan(plan);
        }
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        lock.release().await?;
        println!();
        println!("{}", "警告: 上記の変更をリモートに適用します。".yellow());
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    let ctx = OperationContext::with_cancel(cancel);
    let mut failures = 0;

    for (provider, plan) in &plans {
        if !plan.has_changes {
            continue;
        }

        let auth = provider.check_auth().await?;
        if !auth.authenticated {
            lock.release().await?;
            return Err(anyhow::anyhow!(
                "{} の認証に失敗しました: {}",
                provider.display_name(),
                auth.error.unwrap_or_default()
            ));
        }

        println!();
        println!(
            "{}",
            format!("{} に適用中...", provider.display_name()).blue()
        );

        let desired = workspace.desired.for_provider(provider.name());
        let mut state = global.provider_state(provider.name());
        let result = provider.apply(plan, &desired, &mut state, &ctx).await?;

        // 成功したアクションの分だけ state に反映されている
        global.replace_provider_state(provider.name(), state);
        workspace.state.save(&global).await?;

        utils::print_apply_result(&result);
        failures += result.failed.len();
    }

    lock.release().await?;

    if failures > 0 {
        return Err(anyhow::anyhow!("{}件のアクションが失敗しました", failures));
    }
    println!();
    println!("{}", "✓ 適用が完了しました！".green().bold());
    Ok(())
}
