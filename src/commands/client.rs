//! Client commands talking to a running daemon over D-Bus.

use anyhow::Context;
use periphd::{DbusConfig, DeviceSummary, Value};

use super::CommandResult;

/// List attached devices
pub async fn list(config: &DbusConfig) -> CommandResult {
    let proxy = periphd::dbus::proxy(config).await?;
    let reply = proxy.call_method("ListDevices", &()).await?;
    let json: String = reply.body().deserialize()?;
    let devices: Vec<DeviceSummary> = serde_json::from_str(&json)?;

    if devices.is_empty() {
        println!("No devices attached.");
        return Ok(());
    }
    println!(
        "{:<4} {:<18} {:<18} {:<10} {:<10} {:<5}",
        "#", "Serial", "Class", "Type", "State", "Sync"
    );
    println!("{}", "-".repeat(70));
    for d in devices {
        println!(
            "{:<4} {:<18} {:<18} {:<10} {:<10} {:<5}",
            d.index, d.serial, d.class, d.device_type, d.state, d.effect_sync
        );
    }
    Ok(())
}

/// Call a device method; each CLI argument is one JSON value
pub async fn call(
    config: &DbusConfig,
    serial: &str,
    interface: &str,
    method: &str,
    args: &[String],
) -> CommandResult {
    let values = args
        .iter()
        .map(|a| serde_json::from_str::<Value>(a).with_context(|| format!("argument {a:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let args_json = serde_json::to_string(&values)?;

    let proxy = periphd::dbus::proxy(config).await?;
    let reply = proxy
        .call_method("Call", &(serial, interface, method, args_json.as_str()))
        .await?;
    let result: String = reply.body().deserialize()?;
    if result != "null" {
        println!("{result}");
    }
    Ok(())
}

pub async fn suspend(config: &DbusConfig) -> CommandResult {
    power(config, "Suspend").await
}

pub async fn resume(config: &DbusConfig) -> CommandResult {
    power(config, "Resume").await
}

async fn power(config: &DbusConfig, method: &str) -> CommandResult {
    let proxy = periphd::dbus::proxy(config).await?;
    let reply = proxy.call_method(method, &()).await?;
    let failed: Vec<String> = reply.body().deserialize()?;
    if failed.is_empty() {
        println!("{method}: ok");
    } else {
        println!("{method} failed for: {}", failed.join(", "));
    }
    Ok(())
}

pub async fn set_effect_sync(config: &DbusConfig, enabled: bool) -> CommandResult {
    let proxy = periphd::dbus::proxy(config).await?;
    proxy.call_method("SetEffectSync", &(enabled,)).await?;
    println!("Effect sync {}.", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
