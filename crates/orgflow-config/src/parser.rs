//! KDLパーサー
//!
//! orgflow のプロジェクトファイルを [`ProjectConfig`] に変換します。

use crate::error::{ConfigError, Result};
use crate::model::{
    OrganizationBlock, PollSettings, ProjectConfig, ProviderSettings, TimeoutSettings,
};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;
use std::time::Duration;

/// KDLファイルをパース
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<ProjectConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let doc: KdlDocument = content.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Parsed config file: {}", path.display());
    parse_document(&doc)
}

/// KDL文字列をパース
pub fn parse_config_str(content: &str) -> Result<ProjectConfig> {
    let doc: KdlDocument = content.parse()?;
    parse_document(&doc)
}

fn parse_document(doc: &KdlDocument) -> Result<ProjectConfig> {
    let mut config = ProjectConfig::default();
    let mut provider_seen = false;

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                if provider_seen {
                    return Err(ConfigError::InvalidConfig(
                        "provider は1つだけ指定できます".to_string(),
                    ));
                }
                config.provider = parse_provider(node)?;
                provider_seen = true;
            }
            "organization" => {
                let org = parse_organization(node)?;
                if config.organization(&org.name).is_some() {
                    return Err(ConfigError::InvalidConfig(format!(
                        "organization \"{}\" が重複しています",
                        org.name
                    )));
                }
                config.organizations.push(org);
            }
            other => {
                tracing::warn!("Ignoring unknown top-level node: {}", other);
            }
        }
    }

    Ok(config)
}

fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}

/// provider ノードをパース
pub fn parse_provider(node: &KdlNode) -> Result<ProviderSettings> {
    let name = first_string(node)
        .ok_or_else(|| ConfigError::InvalidConfig("provider requires a name".to_string()))?
        .to_string();
    if name != "workmail" {
        return Err(ConfigError::InvalidConfig(format!(
            "未対応のプロバイダー: {}",
            name
        )));
    }

    let mut provider = ProviderSettings {
        name,
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "region" => provider.region = first_string(child).map(|s| s.to_string()),
                "profile" => provider.profile = first_string(child).map(|s| s.to_string()),
                "delete_directory" | "delete-directory" => {
                    provider.delete_directory = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_bool())
                        .unwrap_or(false);
                }
                "poll" => provider.poll = parse_poll(child)?,
                other => {
                    tracing::warn!("Ignoring unknown provider setting: {}", other);
                }
            }
        }
    }

    Ok(provider)
}

fn parse_poll(node: &KdlNode) -> Result<PollSettings> {
    let mut poll = PollSettings::default();
    if let Some(min) = node.get("min").and_then(|v| v.as_string()) {
        poll.min = parse_duration(min)?;
    }
    if let Some(max) = node.get("max").and_then(|v| v.as_string()) {
        poll.max = parse_duration(max)?;
    }
    if poll.min > poll.max {
        return Err(ConfigError::InvalidConfig(format!(
            "poll min ({:?}) は max ({:?}) 以下にしてください",
            poll.min, poll.max
        )));
    }
    Ok(poll)
}

/// organization ノードをパース
pub fn parse_organization(node: &KdlNode) -> Result<OrganizationBlock> {
    let name = first_string(node)
        .ok_or_else(|| ConfigError::InvalidConfig("organization requires a name".to_string()))?
        .to_string();

    let mut alias = None;
    let mut description = None;
    let mut timeouts = TimeoutSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "alias" => alias = first_string(child).map(|s| s.to_string()),
                "description" => description = first_string(child).map(|s| s.to_string()),
                "timeouts" => {
                    // 例: timeouts create="10m" delete="20m"
                    for (key, slot) in [
                        ("create", &mut timeouts.create),
                        ("update", &mut timeouts.update),
                        ("delete", &mut timeouts.delete),
                    ] {
                        if let Some(value) = child.get(key).and_then(|v| v.as_string()) {
                            *slot = parse_duration(value)?;
                        }
                    }
                }
                other => {
                    tracing::warn!("Ignoring unknown organization setting: {}", other);
                }
            }
        }
    }

    let alias = alias.filter(|a| !a.trim().is_empty()).ok_or_else(|| {
        ConfigError::InvalidConfig(format!("organization \"{}\" には alias が必要です", name))
    })?;

    Ok(OrganizationBlock {
        name,
        alias,
        description,
        timeouts,
    })
}

/// `500ms`, `30s`, `10m`, `1h` 形式の期間をパース
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidDuration(value.to_string());

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (number, unit) = value.split_at(split);
    let number: u64 = number.parse().map_err(|_| invalid())?;

    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(number.checked_mul(60).ok_or_else(invalid)?),
        "h" => Duration::from_secs(number.checked_mul(60 * 60).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };
    Ok(duration)
}
