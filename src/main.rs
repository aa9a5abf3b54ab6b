#[macro_use]
extern crate clap;

use {
    anyhow::{bail, Result},
    log::{error, info},
    met::{
        io::{
            load_basin_masks, load_hybrid_grid, load_mom_grid, load_orca_grid,
            save_atmosphere_output, save_ocean_output, RawAtmosphereSource, RawOceanSource,
        },
        parameters::{GridKind, Parameters},
        pipeline::{run_atmosphere, run_ocean},
    },
    simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode},
    std::fs::{create_dir_all, File},
};

#[quit::main]
fn main() {
    let matches = clap_app!(met =>
        (version: crate_version!())
        (@arg PARAMETERS: -p --parameters +takes_value +required "Path to file containing diagnostic parameters.")
        (@subcommand omet =>
            (about: "Computes ocean meridional energy transport, overturning stream function and heat content.")
        )
        (@subcommand amet =>
            (about: "Computes atmospheric meridional energy transport on hybrid model levels.")
        )
    )
    .get_matches();

    TermLogger::init(
        LevelFilter::Debug,
        LogConfig::default(),
        TerminalMode::Mixed,
    )
    .expect("Failed to initialize logger");

    let params = {
        // Should never panic as clap should return an error if the argument was not supplied
        let path = matches
            .value_of("PARAMETERS")
            .expect("Path to parameters file not supplied");

        let file = File::open(path).unwrap_or_else(|e| {
            error!("Failed to open {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        let params = serde_yaml::from_reader::<_, Parameters>(file).unwrap_or_else(|e| {
            error!("Failed to parse parameters from {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        info!(
            "Successfully loaded diagnostic parameters from \"{}\": \n{:#?}",
            path, params
        );

        params
    };

    run_subcommand(matches.subcommand_name(), params).unwrap_or_else(|e| {
        error!("Error: \"{:#}\"", e);
        quit::with_code(1);
    });
}

fn run_subcommand(subcmd: Option<&str>, params: Parameters) -> Result<()> {
    let subcmd = match subcmd {
        Some(s) => s,
        None => bail!("No subcommand selected"),
    };

    let output_directory = &params.environment.output_directory;
    create_dir_all(output_directory)?;

    info!("Starting {}", subcmd);

    match subcmd {
        "omet" => {
            let masks = load_basin_masks(&params)?;
            let source = RawOceanSource::new(&params);

            let output = match params.numerical.grid {
                GridKind::Orca => run_ocean(&load_orca_grid(&params)?, &masks, &source, &params)?,
                GridKind::Mom => run_ocean(&load_mom_grid(&params)?, &masks, &source, &params)?,
            };

            save_ocean_output(output_directory, &output)?;
        }
        "amet" => {
            let grid = load_hybrid_grid(&params)?;
            let source = RawAtmosphereSource::new(&params);

            let output = run_atmosphere(&grid, &source, &params)?;

            save_atmosphere_output(output_directory, &output)?;
        }
        _ => bail!("Unknown subcommand: {}", subcmd),
    }

    info!("Finished {}", subcmd);

    Ok(())
}
