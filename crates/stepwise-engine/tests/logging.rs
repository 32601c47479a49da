use stepwise_core::{Params, SimError, State, Value};
use stepwise_engine::{Experiment, Model, Scheduler, Simulation, UpdateBlock};
use tracing_test::traced_test;

fn counter_model() -> Model {
    let block = UpdateBlock::new("count").update("n", |ctx, _, _| {
        Ok(("n".into(), Value::Int(ctx.state.i64("n")? + 1)))
    });
    Model::new(State::from_pairs([("n", 0)]), vec![block], Params::new()).unwrap()
}

#[traced_test]
#[test]
fn completion_is_logged() {
    let model = counter_model();
    Experiment::new(vec![Simulation::new(model, 2, 1)])
        .run()
        .unwrap();
    assert!(logs_contain("simulation complete"));
    assert!(logs_contain("experiment complete"));
}

#[traced_test]
#[test]
fn user_failures_are_logged() {
    let block = UpdateBlock::new("broken")
        .decision("sensor", |_, _| Err(SimError::user("sensor-dead", "no reading")));
    let model = Model::new(State::default(), vec![block], Params::new()).unwrap();
    assert!(Simulation::new(model, 1, 1).run().is_err());
    assert!(logs_contain("user function failed"));
}

#[traced_test]
#[test]
fn worker_events_keep_the_simulation_span() {
    let model = counter_model()
        .with_params(&Params::new().sweep("rate", [1, 2, 3]))
        .unwrap();
    Simulation::new(model, 2, 2)
        .with_scheduler(Scheduler::parallel(3))
        .run()
        .unwrap();
    assert!(logs_contain("starting configuration"));
    logs_assert(|lines: &[&str]| {
        let starts: Vec<&&str> = lines
            .iter()
            .filter(|line| line.contains("starting configuration"))
            .collect();
        if starts.len() != 3 {
            return Err(format!("expected 3 configuration starts, saw {}", starts.len()));
        }
        match starts.iter().find(|line| !line.contains("configurations=3")) {
            Some(line) => Err(format!("event outside the simulation span: {line}")),
            None => Ok(()),
        }
    });
}
