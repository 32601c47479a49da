//! Built-in greenhouse grow-cycle model used by the CLI.
//!
//! One timestep is one hour. Two blocks run per step: the climate block
//! fires actuators and moves the environment, the ledger block charges
//! for what was fired and grows the plant.

use rand::Rng;
use stepwise_core::{Params, SimError, State, Value};
use stepwise_engine::{Model, Objective, Signals, StepContext, UpdateBlock};

/// Variables summarised at the final timestep.
pub const METRICS: &[&str] = &[
    "biomass_grams",
    "alpha_balance",
    "health_score",
    "co2_bursts",
    "irrigation_events",
    "total_opex",
];

/// Direction each metric is judged in when comparing variants.
pub const OBJECTIVES: &[(&str, Objective)] = &[
    ("biomass_grams", Objective::Maximize),
    ("alpha_balance", Objective::Maximize),
    ("health_score", Objective::Maximize),
    ("co2_bursts", Objective::Minimize),
    ("irrigation_events", Objective::Minimize),
    ("total_opex", Objective::Minimize),
];

/// Base parameters; run configurations override these.
pub fn base_params() -> Params {
    Params::new()
        .scalar("co2_min", 800)
        .scalar("temp_day_max", 27.0)
        .scalar("soil_moisture_min", 40.0)
        .scalar("light_on_hour", 6)
        .scalar("light_off_hour", 22)
        .scalar("co2_cost", 20)
        .scalar("pump_cost", 25)
        .scalar("fan_cost_per_hour", 10)
        .scalar("light_cost_per_hour", 50)
}

/// Seedling conditions at 6 AM on day zero.
pub fn initial_state() -> State {
    State::from_pairs([
        ("hour_of_day", Value::from(6)),
        ("day", Value::from(0)),
        ("light_is_on", Value::from(true)),
        ("temperature_c", Value::from(24.0)),
        ("co2_ppm", Value::from(800)),
        ("soil_moisture_pct", Value::from(60.0)),
        ("biomass_grams", Value::from(1.0)),
        ("health_score", Value::from(100.0)),
        ("alpha_balance", Value::from(100_000)),
        ("total_opex", Value::from(0)),
        ("co2_bursts", Value::from(0)),
        ("irrigation_events", Value::from(0)),
    ])
}

/// The greenhouse model with its base parameters.
pub fn model() -> Result<Model, SimError> {
    Model::new(initial_state(), vec![climate(), ledger()], base_params())
}

fn climate() -> UpdateBlock {
    UpdateBlock::new("climate")
        .decision("environment", |ctx, _| {
            let temperature = ctx.state.f64("temperature_c")?;
            let excess = (temperature - ctx.params.f64("temp_day_max")?).max(0.0);
            Ok(Signals::new()
                .with("fire_co2", ctx.state.f64("co2_ppm")? < ctx.params.f64("co2_min")?)
                .with(
                    "fire_pump",
                    ctx.state.f64("soil_moisture_pct")? < ctx.params.f64("soil_moisture_min")?,
                )
                .with("fan_duty", (excess / 5.0).min(1.0)))
        })
        .update("hour_of_day", |ctx, _, _| {
            Ok(("hour_of_day".into(), Value::Int((ctx.state.i64("hour_of_day")? + 1) % 24)))
        })
        .update("day", |ctx, _, _| {
            let rolled = ctx.state.i64("hour_of_day")? == 0;
            Ok(("day".into(), Value::Int(ctx.state.i64("day")? + i64::from(rolled))))
        })
        .update("light_is_on", |ctx, _, _| {
            let hour = ctx.state.i64("hour_of_day")?;
            let lit =
                ctx.params.i64("light_on_hour")? <= hour && hour < ctx.params.i64("light_off_hour")?;
            Ok(("light_is_on".into(), Value::Bool(lit)))
        })
        .update("temperature_c", |ctx, signals, rng| {
            let hour = ctx.state.f64("hour_of_day")?;
            let diurnal = 3.0 * (std::f64::consts::PI * (hour - 8.0) / 12.0).sin();
            let led_heat = if ctx.state.bool("light_is_on")? { 2.5 } else { 0.0 };
            let cooling = signals.f64_or("fan_duty", 0.0) * 3.0;
            let noise: f64 = rng.gen_range(-0.5..0.5);
            Ok(("temperature_c".into(), Value::Float(24.0 + diurnal + led_heat - cooling + noise)))
        })
        .update("co2_ppm", |ctx, signals, rng| {
            let base: i64 = if ctx.state.bool("light_is_on")? { 600 } else { 900 };
            let burst = if signals.flag("fire_co2") { 300 } else { 0 };
            let noise: i64 = rng.gen_range(-20..=20);
            Ok(("co2_ppm".into(), Value::Int((base + burst + noise).clamp(400, 2000))))
        })
        .update("soil_moisture_pct", |ctx, signals, rng| {
            let irrigation = if signals.flag("fire_pump") { 25.0 } else { 0.0 };
            let noise: f64 = rng.gen_range(-0.5..0.5);
            let moisture = ctx.state.f64("soil_moisture_pct")? - 1.5 + irrigation + noise;
            Ok(("soil_moisture_pct".into(), Value::Float(moisture.clamp(10.0, 100.0))))
        })
        .update("co2_bursts", |ctx, signals, _| {
            count(ctx, "co2_bursts", signals.flag("fire_co2"))
        })
        .update("irrigation_events", |ctx, signals, _| {
            count(ctx, "irrigation_events", signals.flag("fire_pump"))
        })
}

fn ledger() -> UpdateBlock {
    UpdateBlock::new("ledger")
        .decision("growth", |ctx, _| {
            let rate = if ctx.state.bool("light_is_on")? {
                let temperature = ctx.state.f64("temperature_c")?;
                let temp_factor = (1.0 - ((temperature - 25.0) / 10.0).powi(2)).max(0.0);
                let co2_factor = (ctx.state.f64("co2_ppm")? / 1200.0).min(1.0);
                0.15 * temp_factor * co2_factor * ctx.state.f64("health_score")? / 100.0
            } else {
                0.01
            };
            Ok(Signals::new().with("growth_rate", rate))
        })
        .decision("costs", |ctx, _| {
            let previous = ctx.history.last().unwrap_or(ctx.state);
            let mut cost = 0.0;
            if ctx.state.i64("co2_bursts")? > previous.i64("co2_bursts")? {
                cost += ctx.params.f64("co2_cost")?;
            }
            if ctx.state.i64("irrigation_events")? > previous.i64("irrigation_events")? {
                cost += ctx.params.f64("pump_cost")?;
            }
            if ctx.state.f64("temperature_c")? > ctx.params.f64("temp_day_max")? {
                cost += ctx.params.f64("fan_cost_per_hour")?;
            }
            if ctx.state.bool("light_is_on")? {
                cost += ctx.params.f64("light_cost_per_hour")?;
            }
            Ok(Signals::new().with("cost", cost))
        })
        .update("biomass_grams", |ctx, signals, _| {
            let grown = ctx.state.f64("biomass_grams")? + signals.f64_or("growth_rate", 0.0);
            Ok(("biomass_grams".into(), Value::Float(grown)))
        })
        .update("health_score", |ctx, _, _| {
            let mut penalty = 0.0;
            if ctx.state.f64("temperature_c")? > ctx.params.f64("temp_day_max")? + 3.0 {
                penalty += 0.5;
            }
            if ctx.state.f64("soil_moisture_pct")? < 25.0 {
                penalty += 1.0;
            }
            let recovery = if penalty == 0.0 { 0.1 } else { 0.0 };
            let health = (ctx.state.f64("health_score")? - penalty + recovery).clamp(0.0, 100.0);
            Ok(("health_score".into(), Value::Float(health)))
        })
        .update("alpha_balance", |ctx, signals, _| {
            let cost = signals.f64_or("cost", 0.0) as i64;
            let balance = (ctx.state.i64("alpha_balance")? - cost).max(0);
            Ok(("alpha_balance".into(), Value::Int(balance)))
        })
        .update("total_opex", |ctx, signals, _| {
            let cost = signals.f64_or("cost", 0.0) as i64;
            Ok(("total_opex".into(), Value::Int(ctx.state.i64("total_opex")? + cost)))
        })
}

fn count(ctx: &StepContext<'_>, variable: &str, fired: bool) -> Result<(String, Value), SimError> {
    let total = ctx.state.i64(variable)? + i64::from(fired);
    Ok((variable.to_string(), Value::Int(total)))
}
