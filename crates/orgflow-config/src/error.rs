use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: orgflow.local.kdl, .orgflow.local.kdl, orgflow.kdl, .orgflow.kdl\n\
        - ./.orgflow/ ディレクトリ\n\
        - ~/.config/orgflow/orgflow.kdl\n\
        または ORGFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("KDL パースエラー ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: kdl::KdlError,
    },

    #[error("KDL パースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("不正な設定: {0}")]
    InvalidConfig(String),

    #[error("不正な期間指定 '{0}' (例: 500ms, 30s, 10m, 1h)")]
    InvalidDuration(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
