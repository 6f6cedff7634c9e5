use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CloudProvider, GlobalState, Plan};
use std::sync::Arc;

/// プロバイダーごとの変更計画
pub async fn plan_all(
    workspace: &Workspace,
    global: &GlobalState,
) -> anyhow::Result<Vec<(Arc<dyn CloudProvider>, Plan)>> {
    let mut plans = Vec::new();
    for provider in workspace.providers.iter() {
        let desired = workspace.desired.for_provider(provider.name());
        let current = global.provider_state(provider.name());
        let plan = provider.plan(&desired, &current).await?;
        plans.push((Arc::clone(provider), plan));
    }
    Ok(plans)
}

pub async fn handle(workspace: &Workspace) -> anyhow::Result<()> {
    println!("{}", "変更計画を作成中...".blue());
    println!(
        "設定ファイル: {}",
        workspace.config_path.display().to_string().cyan()
    );
    println!();

    let global = workspace.state.load().await?;
    let plans = plan_all(workspace, &global).await?;

    if plans.iter().all(|(_, plan)| !plan.has_changes) {
        println!("{}", "✓ 変更はありません。リモートは設定と一致しています".green());
        return Ok(());
    }

    for (provider, plan) in &plans {
        if !plan.has_changes {
            continue;
        }
        println!("{}", format!("【{}】", provider.display_name()).bold());
        utils::print_plan(plan);
    }

    println!();
    println!("適用するには {} を実行してください", "orgflow apply".cyan());
    Ok(())
}
