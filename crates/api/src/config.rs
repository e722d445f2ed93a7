//! Configuration loading from the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DEPOT_BIND_HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DEPOT_STORE` | `sqlite` (`memory` for a throwaway store) |
//! | `DATABASE_URL` | `sqlite://warehouse.db?mode=rwc` |
//! | `DEPOT_BARCODE_MAX_LEN` | `128` |
//! | `DEPOT_BARCODE_MODULE_WIDTH` | `2` |
//! | `DEPOT_BARCODE_HEIGHT` | `80` |
//!
//! Malformed values are errors; they never fall back to the default.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};

use depot_inventory::RenderOptions;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://warehouse.db?mode=rwc";

/// Where item records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local; lost on exit.
    Memory,
    Sqlite { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub render: RenderOptions,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (tests pass a map instead of the environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host: IpAddr = parse_or(&lookup, "DEPOT_BIND_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let store = match lookup("DEPOT_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("sqlite") => StoreBackend::Sqlite {
                url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("invalid DEPOT_STORE={other:?}: expected `sqlite` or `memory`"),
        };

        let defaults = RenderOptions::default();
        let render = RenderOptions {
            max_payload_len: parse_or(&lookup, "DEPOT_BARCODE_MAX_LEN", defaults.max_payload_len)?,
            module_width: parse_or(&lookup, "DEPOT_BARCODE_MODULE_WIDTH", defaults.module_width)?,
            bar_height: parse_or(&lookup, "DEPOT_BARCODE_HEIGHT", defaults.bar_height)?,
            ..defaults
        };
        render.validate().context("invalid barcode settings")?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            store,
            render,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {key}={raw:?}: {e}")),
    }
}
