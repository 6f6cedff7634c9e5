use crate::utils;
use crate::workspace::Workspace;
use colored::Colorize;
use orgflow_cloud::{CancellationToken, OperationContext};

pub async fn handle(workspace: &Workspace, yes: bool, cancel: CancellationToken) -> anyhow::Result<()> {
    println!(
        "{}",
        "アカウント内の組織を検索中...".blue()
    );

    let mut found = 0;
    for sweeper in workspace.sweepers.iter() {
        let ids = sweeper.list().await?;
        println!(
            "{}",
            format!("{} ({} 個):", sweeper.resource_type(), ids.len()).bold()
        );
        for id in &ids {
            println!("  {} {}", "-".red(), id);
        }
        found += ids.len();
    }

    if found == 0 {
        println!("{}", "✓ 削除対象はありません".green());
        return Ok(());
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!(
            "{}",
            "警告: ステートに関係なく、上記の組織をすべて削除します。テスト用アカウント以外では実行しないでください。"
                .yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    let ctx = OperationContext::with_cancel(cancel);
    let mut failures = 0;
    for sweeper in workspace.sweepers.iter() {
        println!();
        println!("{}", format!("{} を削除中...", sweeper.resource_type()).blue());
        let result = sweeper.sweep(&ctx).await?;
        utils::print_apply_result(&result);
        failures += result.failed.len();
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{}件の削除に失敗しました", failures));
    }
    println!("{}", "✓ スイープが完了しました".green().bold());
    Ok(())
}
