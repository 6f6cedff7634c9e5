use crate::utils;
use colored::Colorize;
use orgflow_cloud::{GlobalState, StateManager};
use std::path::Path;

/// アドレスに一致するステートのキーを探す
fn find_key(global: &GlobalState, address: &str) -> anyhow::Result<String> {
    let (resource_type, name) = utils::parse_address(address)?;
    let suffix = format!(":{}", utils::resource_key(&resource_type, &name));
    global
        .resources
        .keys()
        .find(|k| k.ends_with(&suffix) && utils::display_address(k) == address)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("{} はステートにありません", address))
}

pub async fn handle_list(project_root: &Path) -> anyhow::Result<()> {
    let manager = StateManager::new(project_root);
    let global = manager.load().await?;

    if global.resources.is_empty() {
        println!("{}", "管理中のリソースはありません".yellow());
        return Ok(());
    }

    let mut keys: Vec<_> = global.resources.keys().collect();
    keys.sort();
    for key in keys {
        let resource = &global.resources[key];
        println!(
            "{}  {}  {:?}",
            utils::display_address(key).cyan(),
            resource.id,
            resource.status
        );
    }
    Ok(())
}

pub async fn handle_show(project_root: &Path, address: &str) -> anyhow::Result<()> {
    let manager = StateManager::new(project_root);
    let global = manager.load().await?;
    let key = find_key(&global, address)?;

    let resource = &global.resources[&key];
    println!("{}", address.cyan().bold());
    println!("{}", serde_json::to_string_pretty(resource)?);
    Ok(())
}

pub async fn handle_rm(project_root: &Path, address: &str) -> anyhow::Result<()> {
    let manager = StateManager::new(project_root);
    let lock = manager.acquire_lock().await?;
    let mut global = manager.load().await?;

    let key = match find_key(&global, address) {
        Ok(key) => key,
        Err(e) => {
            lock.release().await?;
            return Err(e);
        }
    };
    if let Some(removed) = global.remove_resource(&key) {
        manager.save(&global).await?;
        println!(
            "{}",
            format!(
                "✓ {} をステートから外しました (リモートの組織 {} はそのまま残ります)",
                address, removed.id
            )
            .green()
        );
    }

    lock.release().await?;
    Ok(())
}
