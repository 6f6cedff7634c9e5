mod commands;
mod utils;
mod workspace;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orgflow")]
#[command(about = "宣言するだけで、組織が立ち上がる。Amazon WorkMail 組織を KDL で管理", long_about = None)]
struct Cli {
    /// 詳細ログを出力 (RUST_LOG が優先)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 設定を検証
    Validate,
    /// 変更計画を表示
    Plan,
    /// 変更計画を適用
    Apply {
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// リモートの状態を取得してステートを更新
    Refresh,
    /// 既存の組織を管理下に取り込む
    Import {
        /// リソースアドレス (例: workmail_organization.main)
        address: String,
        /// 組織ID (例: m-0123456789abcdef0123456789abcdef)
        id: String,
    },
    /// 管理中のリソースを削除
    Destroy {
        /// 対象のリソースアドレス（省略時は全リソース）
        target: Option<String>,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// ステートを操作
    #[command(subcommand)]
    State(StateCommands),
    /// アカウント内の組織をすべて削除（テスト用アカウント向け）
    Sweep {
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Subcommand)]
enum StateCommands {
    /// 管理中のリソース一覧
    List,
    /// リソースの詳細を表示
    Show {
        /// リソースアドレス (例: workmail_organization.main)
        address: String,
    },
    /// リソースをステートから外す（リモートは削除しない）
    Rm {
        /// リソースアドレス (例: workmail_organization.main)
        address: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout はユーザー向け出力に使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project_root = std::env::current_dir()?;

    match cli.command {
        // 設定ファイル不要なコマンド
        Commands::Version => {
            println!("orgflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::State(state_cmd) => match state_cmd {
            StateCommands::List => commands::state::handle_list(&project_root).await?,
            StateCommands::Show { address } => {
                commands::state::handle_show(&project_root, &address).await?
            }
            StateCommands::Rm { address } => {
                commands::state::handle_rm(&project_root, &address).await?
            }
        },
        Commands::Validate => {
            commands::validate::handle().await?;
        }

        // 設定ファイルとプロバイダーが必要なコマンド
        command => {
            let workspace = workspace::Workspace::load(project_root).await?;
            let cancel = workspace::cancel_on_ctrl_c();

            match command {
                Commands::Plan => commands::plan::handle(&workspace).await?,
                Commands::Apply { yes } => commands::apply::handle(&workspace, yes, cancel).await?,
                Commands::Refresh => commands::refresh::handle(&workspace, cancel).await?,
                Commands::Import { address, id } => {
                    commands::import::handle(&workspace, &address, &id, cancel).await?
                }
                Commands::Destroy { target, yes } => {
                    commands::destroy::handle(&workspace, target.as_deref(), yes, cancel).await?
                }
                Commands::Sweep { yes } => commands::sweep::handle(&workspace, yes, cancel).await?,
                Commands::Version | Commands::State(_) | Commands::Validate => {
                    unreachable!("handled before loading the workspace")
                }
            }
        }
    }

    Ok(())
}
