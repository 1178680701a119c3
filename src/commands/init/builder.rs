//! Interactive configuration builder.

use std::net::UdpSocket;

use super::constants::DNS_PROBE_ADDR;
use crate::{
    config::{
        Config, DEFAULT_CPU, DEFAULT_DISK_GB, DEFAULT_DOCKER_VERSION, DEFAULT_HOSTNAME,
        DEFAULT_MEMORY_GB,
    },
    error::Result,
    tui::Prompt,
};

const ASK_HOSTNAME: &str = "Virtual machine hostname";
const ASK_DISK: &str = "Disk size (in gigabytes)";
const ASK_CPU: &str = "CPU cores to allocate to VM";
const ASK_MEMORY: &str = "Memory to allocate to VM (in gigabytes)";
const ASK_DNS: &str = "DNS server";
const ASK_DOCKER: &str = "Docker version";
const ASK_EXTRA: &str = "Extra flags to pass to the docker daemon";
const ASK_ROUTE: &str = "Allow direct connections to containers";

/// Collect a new configuration, assigning it a fresh identity token.
///
/// `host_address` is offered as the default DNS server.
pub fn build_config(prompt: &mut dyn Prompt, host_address: &str) -> Result<Config> {
    let mut config = Config::with_defaults(host_address);

    let disk = DEFAULT_DISK_GB.to_string();
    let cpu = DEFAULT_CPU.to_string();
    let memory = DEFAULT_MEMORY_GB.to_string();
    prompt.prefill(&[
        (ASK_HOSTNAME, DEFAULT_HOSTNAME),
        (ASK_DISK, disk.as_str()),
        (ASK_CPU, cpu.as_str()),
        (ASK_MEMORY, memory.as_str()),
        (ASK_DNS, host_address),
        (ASK_DOCKER, DEFAULT_DOCKER_VERSION),
        (ASK_EXTRA, ""),
        (ASK_ROUTE, "yes"),
    ])?;

    config.hostname = ask_hostname(prompt)?;
    config.disk = prompt.ask_int(ASK_DISK, DEFAULT_DISK_GB)?;
    config.cpu = prompt.ask_int(ASK_CPU, DEFAULT_CPU)?;
    config.memory = prompt.ask_int(ASK_MEMORY, DEFAULT_MEMORY_GB)?;
    config.dns = prompt.ask_string(ASK_DNS, host_address)?;
    config.docker = prompt.ask_string(ASK_DOCKER, DEFAULT_DOCKER_VERSION)?;
    config.extra = prompt.ask(ASK_EXTRA)?;
    config.route = prompt.ask_bool(ASK_ROUTE, true)?;

    tracing::debug!(?config, "Collected configuration");
    Ok(config)
}

/// Ask for the VM hostname until the answer is a single word.
fn ask_hostname(prompt: &mut dyn Prompt) -> Result<String> {
    loop {
        let hostname = prompt.ask_string(ASK_HOSTNAME, DEFAULT_HOSTNAME)?;
        if hostname.contains(char::is_whitespace) {
            prompt.reject(&format!("'{hostname}' is not a valid hostname"));
        } else {
            return Ok(hostname);
        }
    }
}

/// Best-effort address of this machine on its default route.
///
/// Returns an empty string when no address can be determined.
pub fn host_address() -> String {
    let probe = || -> std::io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(DNS_PROBE_ADDR)?;
        Ok(socket.local_addr()?.ip().to_string())
    };

    probe().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not determine host address");
        String::new()
    })
}
