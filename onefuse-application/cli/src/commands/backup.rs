//! 策略备份与恢复命令

use anyhow::{Context, Result};
use colored::Colorize;
use onefuse_backup::{BackupManager, RestoreSummary};

use super::common::create_client;
use crate::config::CliConfig;

pub async fn backup(config: &CliConfig, connection: Option<&str>, dir: &str) -> Result<()> {
    let client = create_client(config, connection)?;
    let summary = BackupManager::new(client)
        .backup_policies(dir)
        .await
        .with_context(|| format!("备份失败: {}", dir))?;

    println!("{}\n", "备份完成:".bold());
    for (policy_type, count) in &summary.written {
        println!("  {:<32} {}", policy_type.cyan(), count);
    }
    for policy_type in &summary.skipped_types {
        println!("  {:<32} {}", policy_type.bright_black(), "不支持, 已跳过".yellow());
    }
    println!(
        "\n{} 共写入 {} 个文件到 {}",
        "✓".green().bold(),
        summary.total_files(),
        dir.yellow()
    );

    Ok(())
}

pub async fn restore(
    config: &CliConfig,
    connection: Option<&str>,
    dir: &str,
    overwrite: bool,
) -> Result<()> {
    let client = create_client(config, connection)?;
    let summary = BackupManager::new(client)
        .restore_policies_from_file_path(dir, overwrite)
        .await
        .with_context(|| format!("恢复失败: {}", dir))?;

    print_restore_summary(&summary);

    if !summary.failed.is_empty() {
        anyhow::bail!("{} 个文件恢复失败", summary.failed.len());
    }
    Ok(())
}

fn print_restore_summary(summary: &RestoreSummary) {
    println!("{}\n", "恢复结果:".bold());
    println!("  创建: {}", summary.created.len().to_string().green());
    println!("  更新: {}", summary.updated.len().to_string().green());
    println!("  跳过: {}", summary.skipped.len().to_string().bright_black());

    if !summary.ambiguous.is_empty() {
        println!("\n{}", "存在多个同名策略, 已跳过:".yellow());
        for file in &summary.ambiguous {
            println!("  {} {}", "!".yellow().bold(), file);
        }
    }

    if !summary.failed.is_empty() {
        println!("\n{}", "恢复失败:".red());
        for failure in &summary.failed {
            println!("  {} {}: {}", "✗".red().bold(), failure.file, failure.error);
        }
    }
}
