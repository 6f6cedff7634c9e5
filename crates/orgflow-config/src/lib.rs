pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::{parse_config_file, parse_config_str, parse_duration};

use std::path::PathBuf;

/// 設定ファイル名の候補 (優先順)
const CANDIDATES: [&str; 4] = [
    "orgflow.local.kdl",
    ".orgflow.local.kdl",
    "orgflow.kdl",
    ".orgflow.kdl",
];

/// orgflowのグローバル設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("orgflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// プロジェクトの設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ORGFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: orgflow.local.kdl, .orgflow.local.kdl, orgflow.kdl, .orgflow.kdl
/// 3. ./.orgflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/orgflow/orgflow.kdl (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("ORGFLOW_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "ORGFLOW_CONFIG_PATH points to a missing file: {}",
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.orgflow/ ディレクトリで検索
    let project_dir = current_dir.join(".orgflow");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("orgflow").join("orgflow.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイルを探してパースする
pub fn load_config() -> Result<(PathBuf, ProjectConfig)> {
    let path = find_config_file()?;
    let config = parse_config_file(&path)?;
    Ok((path, config))
}
