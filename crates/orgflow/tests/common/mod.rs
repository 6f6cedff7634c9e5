use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) {
        let path = self.root.path().join("orgflow.kdl");
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_state(&self, state: &serde_json::Value) {
        let dir = self.root.path().join(".orgflow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("state.json"),
            serde_json::to_string_pretty(state).unwrap(),
        )
        .unwrap();
    }

    #[allow(dead_code)]
    pub fn read_state(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.root.path().join(".orgflow").join("state.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// orgflow を実行するコマンド (ホーム配下の設定や AWS 設定を読まないよう隔離)
    #[allow(deprecated)]
    pub fn orgflow(&self) -> Command {
        let mut cmd = Command::cargo_bin("orgflow").unwrap();
        let home = self.root.path().join("home");
        fs::create_dir_all(&home).unwrap();
        cmd.current_dir(self.path())
            .env_remove("ORGFLOW_CONFIG_PATH")
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("AWS_CONFIG_FILE", home.join("aws-config"))
            .env("AWS_SHARED_CREDENTIALS_FILE", home.join("aws-credentials"))
            .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
            .env("AWS_SECRET_ACCESS_KEY", "example-secret")
            .env("AWS_EC2_METADATA_DISABLED", "true")
            .env("NO_COLOR", "1")
            .env("RUST_LOG", "warn");
        cmd
    }
}

/// 1組織分のステートファイル
#[allow(dead_code)]
pub fn single_organization_state(name: &str, id: &str, alias: &str) -> serde_json::Value {
    serde_json::json!({
        "version": 1,
        "updated_at": "2026-01-01T00:00:00Z",
        "resources": {
            format!("workmail:workmail_organization:{}", name): {
                "id": id,
                "resource_type": "workmail_organization",
                "status": "active",
                "attributes": {
                    "alias": alias,
                    "state": "Active"
                },
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            }
        }
    })
}
