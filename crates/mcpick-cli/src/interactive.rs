//! Interactive menu and the prompt flows behind each action.

use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use mcpick_core::backup::BackupRecord;
use mcpick_core::client::HostCli;
use mcpick_core::commands::{
    AddCommand, AddOptions, BackupCommand, EditCommand, EditOptions, ProfileCommand, ServerForm,
    parse_args_input, parse_json_input, parse_pairs_input,
};
use mcpick_core::context::AppContext;
use mcpick_core::mcp::{ServerDefinition, TransportType};
use mcpick_core::types::McpScope;

use crate::prompt::{Prompter, required};

/// Main menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    EditConfig,
    Backup,
    AddServer,
    Restore,
    LoadProfile,
    SaveProfile,
    Launch,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 8] = [
        MenuAction::EditConfig,
        MenuAction::Backup,
        MenuAction::AddServer,
        MenuAction::Restore,
        MenuAction::LoadProfile,
        MenuAction::SaveProfile,
        MenuAction::Launch,
        MenuAction::Exit,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuAction::EditConfig => "Edit config       - Toggle MCP servers on/off",
            MenuAction::Backup => "Backup config     - Create a timestamped backup",
            MenuAction::AddServer => "Add MCP server    - Register a new MCP server",
            MenuAction::Restore => "Restore backup    - Restore from a previous backup",
            MenuAction::LoadProfile => "Load profile      - Apply a saved set of servers",
            MenuAction::SaveProfile => "Save profile      - Save the enabled servers by name",
            MenuAction::Launch => "Launch Claude Code",
            MenuAction::Exit => "Exit",
        }
    }
}

/// How the add-server flow collects its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddMethod {
    Json,
    Form,
}

pub struct InteractiveApp<'a, P: Prompter> {
    ctx: &'a AppContext,
    host: &'a dyn HostCli,
    prompter: P,
}

impl<'a, P: Prompter> InteractiveApp<'a, P> {
    pub fn new(ctx: &'a AppContext, host: &'a dyn HostCli, prompter: P) -> Self {
        Self {
            ctx,
            host,
            prompter,
        }
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Loop over the main menu until exit or cancel. A failing action is
    /// shown, then the user decides whether to go back to the menu.
    pub fn run(&mut self) -> Result<()> {
        let labels: Vec<String> = MenuAction::ALL
            .iter()
            .map(|action| action.label().to_string())
            .collect();

        loop {
            let Some(index) = self
                .prompter
                .select("What would you like to do?", &labels, 0)?
            else {
                self.prompter.note("Operation cancelled")?;
                return Ok(());
            };
            let action = MenuAction::ALL[index];
            if action == MenuAction::Exit {
                self.prompter.note("Goodbye!")?;
                return Ok(());
            }

            if let Err(err) = self.dispatch(action) {
                tracing::debug!("Action failed: {err:?}");
                self.prompter.warn(&format!("{err:#}"))?;
                let choices = vec![
                    "Yes, return to main menu".to_string(),
                    "No, exit".to_string(),
                ];
                let again = self
                    .prompter
                    .select("Would you like to continue?", &choices, 0)?;
                if again != Some(0) {
                    self.prompter.note("Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    pub fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::EditConfig => self.edit_config(),
            MenuAction::Backup => self.backup(),
            MenuAction::AddServer => self.add_server(),
            MenuAction::Restore => self.restore(),
            MenuAction::LoadProfile => self.load_profile(),
            MenuAction::SaveProfile => self.save_profile(),
            MenuAction::Launch => self.launch(),
            MenuAction::Exit => Ok(()),
        }
    }

    fn prompt_scope(&mut self, prompt: &str) -> Result<Option<McpScope>> {
        let labels: Vec<String> = McpScope::ALL
            .iter()
            .map(|scope| format!("{:<14} - {}", scope.label(), scope.description()))
            .collect();
        Ok(self
            .prompter
            .select(prompt, &labels, 0)?
            .map(|index| McpScope::ALL[index]))
    }

    pub fn edit_config(&mut self) -> Result<()> {
        let Some(scope) = self.prompt_scope("Which configuration do you want to edit?")? else {
            return Ok(());
        };

        let command = EditCommand::new(self.ctx, self.host);
        let available = command.available_servers(scope)?;
        if available.imported > 0 {
            self.prompter.note(&format!(
                "Imported {} servers from existing configuration into the registry.",
                available.imported
            ))?;
        }
        if available.servers.is_empty() {
            self.prompter
                .note("No MCP servers found in the host config or registry. Add servers first.")?;
            return Ok(());
        }

        let current = command.current_enabled(scope)?;
        let items: Vec<String> = available.servers.iter().map(server_label).collect();
        let defaults: Vec<bool> = available
            .servers
            .iter()
            .map(|server| current.contains(&server.name))
            .collect();
        let Some(picked) = self.prompter.multi_select(
            &format!("Select MCP servers for {}:", scope.description()),
            &items,
            &defaults,
        )?
        else {
            return Ok(());
        };

        let selected = picked
            .into_iter()
            .filter_map(|index| available.servers.get(index))
            .map(|server| server.name.clone())
            .collect();
        let report = command.execute(&EditOptions::new(scope, selected))?;

        for error in &report.errors {
            self.prompter.warn(error)?;
        }
        if !report.via_host_cli && scope != McpScope::User {
            let target = self.ctx.scope_resolver().write_target(scope);
            self.prompter.warn(&format!(
                "Claude CLI not available. Changes written directly to {}.",
                target.path.display()
            ))?;
        }
        let summary = if report.errors.is_empty() {
            format!(
                "Configuration updated!\nScope: {}\nEnabled servers: {}",
                scope.label(),
                report.enabled
            )
        } else {
            format!(
                "Configuration updated with {} errors.\nScope: {}\nAdded: {}, Removed: {}",
                report.errors.len(),
                scope.label(),
                report.added.len(),
                report.removed.len()
            )
        };
        self.prompter.note(&summary)
    }

    pub fn backup(&mut self) -> Result<()> {
        let record = BackupCommand::new(self.ctx).create()?;
        self.prompter.note(&format!(
            "Configuration backed up to:\n{}",
            record.path.display()
        ))
    }

    pub fn restore(&mut self) -> Result<()> {
        let command = BackupCommand::new(self.ctx);
        let backups = command.list()?;
        if backups.is_empty() {
            self.prompter.note("No backups found.")?;
            return Ok(());
        }

        let now = Local::now().naive_local();
        let items: Vec<String> = backups
            .iter()
            .map(|backup| backup_label(backup, now))
            .collect();
        let Some(index) = self
            .prompter
            .select("Select backup to restore:", &items, 0)?
        else {
            return Ok(());
        };

        let confirmed = self.prompter.confirm(
            &format!(
                "This will replace the enabled MCP servers in {}. Continue?",
                self.ctx.paths().host_config().display()
            ),
            false,
        )?;
        if confirmed != Some(true) {
            return Ok(());
        }

        let report = command.restore(&backups[index])?;
        self.prompter.note(&format!(
            "Configuration restored successfully!\nEnabled servers: {}",
            report.servers.len()
        ))
    }

    pub fn load_profile(&mut self) -> Result<()> {
        let command = ProfileCommand::new(self.ctx);
        let profiles = command.list()?;
        if profiles.is_empty() {
            self.prompter.note(&format!(
                "No profiles found in {}.\nSave one from the menu first.",
                self.ctx.paths().profiles_dir().display()
            ))?;
            return Ok(());
        }

        let items: Vec<String> = profiles
            .iter()
            .map(|profile| format!("{} ({} servers)", profile.name, profile.server_count))
            .collect();
        let Some(index) = self.prompter.select("Select profile to load:", &items, 0)? else {
            return Ok(());
        };

        let report = command.apply(&profiles[index].name)?;
        self.prompter.note(&format!(
            "Profile '{}' loaded.\nEnabled servers: {}",
            report.name,
            report.servers.join(", ")
        ))
    }

    pub fn save_profile(&mut self) -> Result<()> {
        let validate = required("Profile name");
        let Some(name) = self
            .prompter
            .input("Profile name:", None, Some(&validate))?
        else {
            return Ok(());
        };

        let info = ProfileCommand::new(self.ctx).save(name.trim())?;
        self.prompter.note(&format!(
            "Saved {} servers to profile '{}':\n{}",
            info.server_count,
            info.name,
            info.path.display()
        ))
    }

    pub fn launch(&mut self) -> Result<()> {
        self.prompter.note("Launching Claude Code...")?;
        self.host.launch()
    }

    pub fn add_server(&mut self) -> Result<()> {
        let Some(scope) = self.prompt_scope("Where should this server be installed?")? else {
            return Ok(());
        };
        let methods = vec![
            "Paste JSON configuration - complete server config as JSON".to_string(),
            "Step-by-step form        - fill out fields one by one".to_string(),
        ];
        let method = match self
            .prompter
            .select("How would you like to add the server?", &methods, 0)?
        {
            None => return Ok(()),
            Some(0) => AddMethod::Json,
            Some(_) => AddMethod::Form,
        };

        let definition = match method {
            AddMethod::Json => self.collect_json()?,
            AddMethod::Form => self.collect_form()?,
        };
        let Some(definition) = definition else {
            return Ok(());
        };

        let mut details = server_details(&definition);
        details.push(format!("Scope: {}", scope.label()));
        self.prompter
            .note(&format!("Server to add:\n{}", details.join("\n")))?;
        if self.prompter.confirm("Add this server?", true)? != Some(true) {
            return Ok(());
        }

        let report =
            AddCommand::new(self.ctx, self.host).execute(&AddOptions { definition, scope })?;
        for warning in &report.warnings {
            self.prompter.warn(warning)?;
        }
        if report.installed {
            self.prompter.note(&format!(
                "Server \"{}\" installed successfully!\nScope: {}\nAlso added to the mcpick registry.",
                report.name,
                scope.label()
            ))?;
        }
        Ok(())
    }

    fn collect_json(&mut self) -> Result<Option<ServerDefinition>> {
        let validate = |value: &str| {
            parse_json_input(value)
                .map(|_| ())
                .map_err(|err| format!("{err:#}"))
        };
        let Some(text) = self
            .prompter
            .input("Paste JSON configuration:", None, Some(&validate))?
        else {
            return Ok(None);
        };
        Ok(Some(parse_json_input(&text)?))
    }

    fn collect_form(&mut self) -> Result<Option<ServerDefinition>> {
        let mut form = ServerForm::default();

        let validate_name = required("Server name");
        let Some(name) = self.prompter.input("Server name:", None, Some(&validate_name))? else {
            return Ok(None);
        };
        form.name = name.trim().to_string();

        let advanced = self.prompter.confirm(
            "Configure advanced settings (transport, env variables, headers)?",
            false,
        )?;
        let Some(advanced) = advanced else {
            return Ok(None);
        };

        if advanced {
            let transports: Vec<String> = TransportType::ALL
                .iter()
                .map(|kind| kind.as_str().to_string())
                .collect();
            let Some(index) = self.prompter.select("Transport type:", &transports, 0)? else {
                return Ok(None);
            };
            form.transport = TransportType::ALL[index];
        }

        if form.transport.is_remote() {
            let validate_url = required("URL");
            let Some(url) = self.prompter.input("Server URL:", None, Some(&validate_url))? else {
                return Ok(None);
            };
            form.url = url.trim().to_string();
        } else {
            let validate_command = required("Command");
            let Some(command) = self
                .prompter
                .input("Command to run:", None, Some(&validate_command))?
            else {
                return Ok(None);
            };
            form.command = command.trim().to_string();

            let Some(args) = self
                .prompter
                .input("Arguments (comma-separated):", Some(""), None)?
            else {
                return Ok(None);
            };
            form.args = parse_args_input(&args);
        }

        let Some(description) = self
            .prompter
            .input("Description (optional):", Some(""), None)?
        else {
            return Ok(None);
        };
        form.description = description;

        if advanced {
            let validate_env = |value: &str| {
                parse_pairs_input(value, "env").map(|_| ()).map_err(|err| err.to_string())
            };
            let Some(env) = self.prompter.input(
                "Environment variables (KEY=value, comma-separated):",
                Some(""),
                Some(&validate_env),
            )?
            else {
                return Ok(None);
            };
            form.env = parse_pairs_input(&env, "env")?;

            if form.transport.is_remote() {
                let validate_headers = |value: &str| {
                    parse_pairs_input(value, "header")
                        .map(|_| ())
                        .map_err(|err| err.to_string())
                };
                let Some(headers) = self.prompter.input(
                    "HTTP headers (KEY=value, comma-separated):",
                    Some(""),
                    Some(&validate_headers),
                )?
                else {
                    return Ok(None);
                };
                form.headers = parse_pairs_input(&headers, "header")?;
            }
        }

        Ok(Some(form.build()?))
    }
}

fn server_label(server: &ServerDefinition) -> String {
    match &server.description {
        Some(description) => format!("{} - {}", server.name, description),
        None => server.name.clone(),
    }
}

fn server_details(server: &ServerDefinition) -> Vec<String> {
    let mut details = vec![format!("Name: {}", server.name)];
    if let Some(command) = server.command() {
        let line = format!("Command: {} {}", command, server.args().join(" "));
        details.push(line.trim_end().to_string());
    }
    if let Some(url) = server.url() {
        details.push(format!("URL: {url}"));
    }
    details.push(format!(
        "Description: {}",
        server.description.as_deref().unwrap_or("None")
    ));
    details.push(format!("Transport: {}", server.transport_type()));
    if !server.env.is_empty() {
        details.push(format!("Environment: {} variables", server.env.len()));
    }
    if let Some(headers) = server.headers().filter(|headers| !headers.is_empty()) {
        details.push(format!("Headers: {} headers", headers.len()));
    }
    details
}

fn backup_label(backup: &BackupRecord, now: NaiveDateTime) -> String {
    format!(
        "{} ({}, {})",
        backup.filename,
        backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
        time_ago(backup.timestamp, now)
    )
}

fn time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let minutes = (now - then).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;
    let plural = |n: i64| if n == 1 { "" } else { "s" };
    if days > 0 {
        format!("{days} day{} ago", plural(days))
    } else if hours > 0 {
        format!("{hours} hour{} ago", plural(hours))
    } else if minutes > 0 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else {
        "just now".to_string()
    }
}
