//! Profile commands: apply, save, list.

use anyhow::Context;

use crate::context::AppContext;
use crate::profile::ProfileInfo;

/// Report from applying a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub name: String,
    pub servers: Vec<String>,
}

pub struct ProfileCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> ProfileCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Make the profile's servers the user-scope enabled set and make sure
    /// each is in the registry.
    pub fn apply(&self, name: &str) -> anyhow::Result<ApplyReport> {
        let profile = self.ctx.profiles().load(name)?;
        self.ctx
            .reconciler()
            .write_enabled(&profile.servers)
            .with_context(|| format!("Failed to apply profile '{name}'"))?;
        self.ctx
            .registry()
            .sync_many(profile.servers.iter().cloned())?;
        tracing::info!(profile = %name, count = profile.servers.len(), "Applied profile");
        Ok(ApplyReport {
            name: name.to_string(),
            servers: profile.server_names(),
        })
    }

    /// Save the currently enabled user-scope servers under `name`.
    pub fn save(&self, name: &str) -> anyhow::Result<ProfileInfo> {
        let live = self.ctx.reconciler().read_enabled()?;
        self.ctx.profiles().save(name, &live)
    }

    pub fn list(&self) -> anyhow::Result<Vec<ProfileInfo>> {
        self.ctx.profiles().list()
    }
}
