use bossrush_core::{AppConfigExt, CombatState, EncounterStatus};
use std::io::Write;

use crate::context::CliContext;
use crate::presenter::health_bar;

pub async fn strike(ctx: &CliContext, count: u32) -> Result<(), String> {
    for _ in 0..count.max(1) {
        match ctx.encounter.strike().await? {
            Ok(result) if result.defeated => {
                println!("Final blow for {} damage!", result.damage);
                settle(ctx).await?;
                return Ok(());
            }
            Ok(_) => {}
            Err(rejected) => {
                println!("Strike rejected: {rejected}");
                return Ok(());
            }
        }
    }
    Ok(())
}

pub async fn show_status(ctx: &CliContext) -> Result<(), String> {
    print_status(&ctx.encounter.status());
    Ok(())
}

pub async fn retry(ctx: &CliContext) -> Result<(), String> {
    ctx.encounter.retry().await?;
    settle(ctx).await
}

pub async fn abandon(ctx: &CliContext) -> Result<(), String> {
    let boss = ctx.encounter.abandon().await?;
    println!("Moved on to {} [{}]", boss.name, boss.alt_text());
    Ok(())
}

pub async fn show_profile(ctx: &CliContext) -> Result<(), String> {
    let user_id = ctx.config.read().await.user_id.clone();
    let record = ctx.encounter.profile().await?;

    println!("{:<14} {}", "User", user_id);
    if let Some(name) = record.profile.display_name() {
        println!("{:<14} {}", "Name", name);
    }
    if record.profile.is_premium == Some(true) {
        println!("{:<14} yes", "Premium");
    }
    println!("{:<14} {}", "Attack power", record.attack_power);
    println!("{:<14} {}", "Coin", record.mined_boss_coin);
    println!("{:<14} {}", "Experience", record.total_experience);
    Ok(())
}

pub async fn show_config(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    let service = if ctx.offline {
        "offline (built-in catalog)"
    } else {
        config.base_url()
    };
    println!("{:<14} {}", "Service", service);
    println!("{:<14} {}", "User", display_or_unset(&config.user_id));
    println!("{:<14} {}s", "Timeout", config.request_timeout_secs);
    println!("{:<14} {}", "Selection", config.selection.label());
    Ok(())
}

pub async fn set_user(ctx: &CliContext, user_id: &str) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.user_id = user_id.trim().to_string();
    config.save().map_err(|e| e.to_string())?;
    println!("User set to {}; takes effect on next launch", config.user_id);
    Ok(())
}

pub async fn set_url(ctx: &CliContext, url: &str) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.set_service_url(url).map_err(|e| e.to_string())?;
    config.save().map_err(|e| e.to_string())?;
    println!("Service set to {}; takes effect on next launch", config.service_url);
    Ok(())
}

pub async fn exit(ctx: &CliContext) -> Result<(), String> {
    // The service may already be gone; quitting should still succeed
    let _ = ctx.encounter.shutdown().await;
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

/// Wait for an in-flight reconciliation to land so its output prints before the prompt
async fn settle(ctx: &CliContext) -> Result<(), String> {
    let status = ctx.encounter.wait_for_status(|s| !s.reconciling).await?;
    if status.state == CombatState::Idle && status.last_error.is_none() {
        println!("Encounter over. Use `retry` to look for another boss.");
    }
    Ok(())
}

fn print_status(status: &EncounterStatus) {
    println!("{:<14} {}", "State", status.state.label());
    match &status.boss {
        Some(boss) => {
            println!("{:<14} {} [{}]", "Boss", boss.name, boss.alt_text());
            println!(
                "{:<14} {}",
                "Health",
                health_bar(status.current_health, status.max_health)
            );
        }
        None => println!("{:<14} none", "Boss"),
    }
    println!("{:<14} {}", "Attack power", status.attack_power);
    println!("{:<14} {}", "Defeated", status.bosses_defeated);
    if let Some(reward) = status.last_reward {
        println!("{:<14} +{} coin, +{} xp", "Last reward", reward.coin, reward.xp);
    }
    if status.reconciling {
        println!("{:<14} in progress", "Reconciling");
    }
    if let Some(error) = &status.last_error {
        println!("{:<14} {}", "Last error", error);
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}
