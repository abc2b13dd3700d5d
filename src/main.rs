use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, error, info, warn};

use radio_link_planner::common::{Scenario, load_scenario};
use radio_link_planner::config::{OutputFormat, PlannerConfig};
use radio_link_planner::engine::{LinkBudget, McsFamily, SweepPair, SweepResult, compute_link_budget, generate_report, sweep_mcs_by_name};

#[derive(Parser, Debug)]
#[command(name = "radio-link-planner")]
#[command(version, about = "Plan 802.11n radio links: MCS sweep and link budget", long_about = None)]
struct Cli {
    /// Scenario file (JSON)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Settings file; defaults to config.toml next to the scenario
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
}

/// Outcome of one planning run, ready to print.
struct PlanOutput {
    profile: Option<String>,
    preferred_family: McsFamily,
    sweeps: Option<SweepPair>,
    budget: Option<(LinkBudget, String)>,
}

fn load_config(explicit: Option<&Path>, scenario_path: &str) -> Result<(PlannerConfig, Option<String>)> {
    if let Some(path) = explicit {
        let config = PlannerConfig::load(path).map_err(anyhow::Error::msg)?;
        return Ok((config, None));
    }
    let path = PlannerConfig::config_path_from_scenario(scenario_path);
    if !path.exists() {
        return Ok((PlannerConfig::default(), None));
    }
    match PlannerConfig::load(&path) {
        Ok(config) => Ok((config, None)),
        // Reported once the logger is up
        Err(e) => Ok((PlannerConfig::default(), Some(format!("{}: {}", path.display(), e)))),
    }
}

fn plan(scenario: &Scenario, config: &PlannerConfig) -> Result<PlanOutput> {
    let mut output = PlanOutput {
        profile: None,
        preferred_family: McsFamily::Diversity,
        sweeps: None,
        budget: None,
    };

    if let Some(link) = &scenario.link {
        let catalog = scenario.catalog().map_err(anyhow::Error::msg)?;
        let profile = scenario.profile.clone().unwrap_or_else(|| config.default_profile.clone());
        let pair = sweep_mcs_by_name(&catalog, &profile, link).with_context(|| format!("MCS sweep with profile {}", profile))?;
        output.preferred_family = link.mcs_family;
        output.profile = Some(profile);
        output.sweeps = Some(pair);
    }

    if let Some(params) = &scenario.budget {
        let budget = compute_link_budget(params).context("Link budget")?;
        let report = generate_report(&budget, params.distance_km, params.frequency_ghz, params.bandwidth_mhz);
        output.budget = Some((budget, report));
    }

    Ok(output)
}

fn print_sweep(result: &SweepResult) {
    println!(
        "{} family (aggregation {}, correction {:.4}, demand {:.2} Mbps)",
        result.family, result.frame_aggregation_count, result.frequency_correction, result.total_throughput_demand_mbps
    );
    println!(
        "{:>4} {:>8} {:>6} {:>10} {:>11} {:>10} {:>8} {:>5} {:>5}",
        "MCS", "Mod", "Code", "Range m", "Thrpt Mbps", "Fresnel m", "SNR dB", "Thr", "Clr"
    );
    for p in &result.points {
        let marker = if p.mcs_index == result.final_mcs_index { "*" } else { " " };
        println!(
            "{}{:>3} {:>8} {:>6.3} {:>10.1} {:>11.2} {:>10.1} {:>8.1} {:>5} {:>5}",
            marker,
            p.mcs_index,
            p.modulation.to_string(),
            p.coding_rate,
            p.range_m,
            p.throughput_mbps,
            p.fresnel_clearance_m,
            p.snr_db,
            if p.meets_throughput { "yes" } else { "no" },
            if p.meets_clearance { "yes" } else { "no" },
        );
    }
    if result.has_viable_link() {
        println!(
            "Selected MCS {}: range {:.1} m, Fresnel clearance {:.1} m",
            result.final_mcs_index, result.final_range_m, result.final_fresnel_clearance_m
        );
    } else {
        println!("No viable link for this configuration");
    }
    println!();
}

fn print_text(output: &PlanOutput) {
    if let (Some(profile), Some(pair)) = (&output.profile, &output.sweeps) {
        println!("Radio profile: {}", profile);
        println!();
        let other = match output.preferred_family {
            McsFamily::Diversity => McsFamily::Multiplexing,
            McsFamily::Multiplexing => McsFamily::Diversity,
        };
        print_sweep(pair.selected(output.preferred_family));
        print_sweep(pair.selected(other));
    }
    if let Some((_, report)) = &output.budget {
        print!("{}", report);
    }
}

fn print_json(output: &PlanOutput) -> Result<()> {
    let document = serde_json::json!({
        "profile": output.profile,
        "preferred_family": output.preferred_family,
        "sweeps": output.sweeps,
        "budget": output.budget.as_ref().map(|(budget, _)| budget),
        "report": output.budget.as_ref().map(|(_, report)| report),
    });
    println!("{}", serde_json::to_string_pretty(&document).context("Serializing results")?);
    Ok(())
}

fn init_logging(config: &PlannerConfig) {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("radio_link_planner"), config.log_level.to_level_filter())
        .parse_default_env()
        .init();
}

fn run(scenario_path: &str, config: &PlannerConfig) -> Result<()> {
    info!("Loading scenario {}", scenario_path);
    let scenario = load_scenario(scenario_path).with_context(|| format!("Scenario {}", scenario_path))?;
    let output = plan(&scenario, config)?;

    match config.output_format {
        OutputFormat::Text => print_text(&output),
        OutputFormat::Json => print_json(&output)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let scenario_path = cli.scenario.to_string_lossy().into_owned();

    // The logger needs the config, so it starts after the config is read
    let result = match load_config(cli.config.as_deref(), &scenario_path) {
        Ok((config, config_warning)) => {
            init_logging(&config);
            if let Some(warning) = config_warning {
                warn!("Ignoring config file {}", warning);
            }
            run(&scenario_path, &config)
        }
        Err(e) => {
            init_logging(&PlannerConfig::default());
            Err(e)
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_takes_scenario_and_optional_config() {
        let cli = Cli::try_parse_from(["radio-link-planner", "scenarios/mini-oem.json"]).unwrap();
        assert_eq!(cli.scenario, PathBuf::from("scenarios/mini-oem.json"));
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["radio-link-planner", "a.json", "b.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn cli_rejects_missing_or_extra_arguments() {
        assert!(Cli::try_parse_from(["radio-link-planner"]).is_err());
        assert!(Cli::try_parse_from(["radio-link-planner", "a.json", "b.toml", "c"]).is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let missing = Path::new("/nonexistent/radio-link-planner/config.toml");
        assert!(load_config(Some(missing), "scenario.json").is_err());
    }
}
