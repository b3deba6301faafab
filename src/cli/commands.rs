//! Command dispatch: turns parsed arguments into service calls

use std::io;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::dto::{LineCreateRequest, LineUpdateRequest, SectionCreateRequest};
use crate::cli::args::{
    Cli, Commands, ConfigCommands, LineCommands, SectionCommands, StationCommands,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{LineId, StationId};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => execute_config(cli, command),
        Some(Commands::Station { command }) => {
            let container = build_container(cli)?;
            execute_station(&container, command)
        }
        Some(Commands::Line { command }) => {
            let container = build_container(cli)?;
            execute_line(&container, command)
        }
        Some(Commands::Section { command }) => {
            let container = build_container(cli)?;
            execute_section(&container, command)
        }
        None => Err(CliError::Usage(
            "no command given, see `subway --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir()
        .map_err(|e| CliError::InvalidArgs(format!("cannot read working directory: {e}")))?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(data_file) = &cli.data_file {
        settings.set_data_file(data_file);
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::new(settings)?)
}

#[instrument(skip(cli))]
fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory)"),
            }
            let cwd = std::env::current_dir().map_err(|e| {
                CliError::InvalidArgs(format!("cannot read working directory: {e}"))
            })?;
            output::info(&format!("local:  {}", local_config_path(&cwd).display()));
            output::info(&format!("data:   {}", load_settings(cli)?.data_file.display()));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

#[instrument(skip(container))]
fn execute_station(container: &ServiceContainer, command: &StationCommands) -> CliResult<()> {
    let service = &container.stations;
    match command {
        StationCommands::Add { name } => {
            let response = service.create_station(name)?;
            output::status(response.status, &format!("station {}", response.body.id));
            output::station(&response.body);
        }
        StationCommands::List => {
            for station in service.find_all_stations()?.body {
                output::station(&station);
            }
        }
        StationCommands::Show { id } => {
            output::station(&service.find_station(StationId(*id))?.body);
        }
        StationCommands::Remove { id } => {
            let response = service.delete_station(StationId(*id))?;
            output::status(response.status, &format!("station {id} deleted"));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn execute_line(container: &ServiceContainer, command: &LineCommands) -> CliResult<()> {
    let service = &container.lines;
    match command {
        LineCommands::Create {
            name,
            color,
            up,
            down,
            distance,
        } => {
            let request = LineCreateRequest {
                name: name.clone(),
                color: color
                    .clone()
                    .unwrap_or_else(|| container.settings.default_color.clone()),
                up_station_id: StationId(*up),
                down_station_id: StationId(*down),
                distance: *distance,
            };
            let response = service.create_line(&request)?;
            output::status(response.status, &format!("line {}", response.body.id));
            output::line(&response.body);
        }
        LineCommands::List => {
            for line in service.find_all_lines()?.body {
                output::line(&line);
            }
        }
        LineCommands::Show { id } => output::line(&service.find_line(LineId(*id))?.body),
        LineCommands::Update { id, name, color } => {
            if name.is_none() && color.is_none() {
                return Err(CliError::InvalidArgs(
                    "nothing to update, pass --name and/or --color".to_string(),
                ));
            }
            let request = LineUpdateRequest {
                name: name.clone(),
                color: color.clone(),
            };
            let response = service.update_line(LineId(*id), &request)?;
            output::status(response.status, &format!("line {id} updated"));
            output::line(&response.body);
        }
        LineCommands::Delete { id } => {
            let response = service.delete_line(LineId(*id))?;
            output::status(response.status, &format!("line {id} deleted"));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn execute_section(container: &ServiceContainer, command: &SectionCommands) -> CliResult<()> {
    let service = &container.lines;
    match command {
        SectionCommands::Add {
            line,
            up,
            down,
            distance,
        } => {
            let request = SectionCreateRequest::new(StationId(*up), StationId(*down), *distance);
            let response = service.add_section(LineId(*line), &request)?;
            output::status(response.status, &format!("section {up} -> {down}"));
            output::line(&response.body);
        }
        SectionCommands::Remove { line, station } => {
            let response = service.remove_section(LineId(*line), StationId(*station))?;
            output::status(
                response.status,
                &format!("station {station} removed from line {line}"),
            );
        }
    }
    Ok(())
}
