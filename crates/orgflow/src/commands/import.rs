use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CancellationToken, OperationContext};

pub async fn handle(
    workspace: &Workspace,
    address: &str,
    id: &str,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (resource_type, name) = utils::parse_address(address)?;
    let provider = workspace.providers.for_resource_type(&resource_type)?;
    let key = utils::state_key(provider.name(), &resource_type, &name);

    println!(
        "{} を {} として取り込みます...",
        id.cyan(),
        address.cyan()
    );

    if workspace.desired.get(&resource_type, &name).is_none() {
        println!(
            "{}",
            format!(
                "警告: {} は設定ファイルにありません。次回の apply で削除対象になります",
                address
            )
            .yellow()
        );
    }

    let lock = workspace.state.acquire_lock().await?;
    let mut global = workspace.state.load().await?;
    if let Some(existing) = global.get_resource(&key) {
        lock.release().await?;
        return Err(anyhow::anyhow!(
            "{} は既に管理されています (id: {})。先に orgflow state rm を実行してください",
            address,
            existing.id
        ));
    }

    let ctx = OperationContext::with_cancel(cancel);
    let imported = provider.import(&resource_type, id, &ctx).await?;

    let alias = imported
        .get_attribute::<String>("alias")
        .unwrap_or_default();
    global.set_resource(key, imported);
    workspace.state.save(&global).await?;
    lock.release().await?;

    println!(
        "{}",
        format!("✓ {} (alias: {}) を取り込みました", address, alias)
            .green()
            .bold()
    );
    Ok(())
}
