use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CancellationToken, OperationContext};

pub async fn handle(workspace: &Workspace, cancel: CancellationToken) -> anyhow::Result<()> {
    println!("{}", "リモートの状態を取得中...".blue());

    let lock = workspace.state.acquire_lock().await?;
    let mut global = workspace.state.load().await?;
    let ctx = OperationContext::with_cancel(cancel);

    for provider in workspace.providers.iter() {
        let mut state = global.provider_state(provider.name());
        if state.resources.is_empty() {
            continue;
        }

        let dropped = provider.refresh(&mut state, &ctx).await?;
        for key in &dropped {
            println!(
                "  {} {} はリモートに存在しないためステートから外しました",
                "-".red(),
                utils::display_address(&format!("{}:{}", provider.name(), key)).cyan()
            );
        }
        for (key, resource) in state.iter() {
            println!(
                "  {} {} ({}, {:?})",
                "✓".green(),
                utils::display_address(&format!("{}:{}", provider.name(), key)).cyan(),
                resource.id,
                resource.status
            );
        }

        global.replace_provider_state(provider.name(), state);
    }

    workspace.state.save(&global).await?;
    lock.release().await?;

    println!("{}", "✓ ステートを更新しました".green());
    Ok(())
}
