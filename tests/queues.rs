mod util;

use mmc_sim::simulation::{QueueParameters, RunState, Simulation};
use mmc_sim::timeline::EventKind;
use mmc_sim::variates::Variates;
use mmc_sim::{run_simulation, simulate, theoretical_mmc, Error};

/// Single-server reference that keeps its pending events in a vector re-sorted after every insertion and tracks
/// the server only through the length of the line.
fn sorted_list_mm1(arrival_rate: f64, service_rate: f64, total_customers: usize, seed: u64) -> (Vec<usize>, Vec<f64>) {
    let mut variates = Variates::from_seed(seed);
    let mut events: Vec<(f64, EventKind)> = Vec::new();
    let mut line: Vec<f64> = Vec::new();
    let mut queue_lengths = Vec::new();
    let mut response_times = Vec::new();

    fn schedule(events: &mut Vec<(f64, EventKind)>, time: f64, kind: EventKind) {
        events.push((time, kind));
        events.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    }

    let first = variates.exponential(arrival_rate).unwrap();
    schedule(&mut events, first, EventKind::Arrival);

    let mut served = 0;
    while served < total_customers {
        let (now, kind) = events.remove(0);
        queue_lengths.push(line.len());
        match kind {
            EventKind::Arrival => {
                line.push(now);
                let next = now + variates.exponential(arrival_rate).unwrap();
                schedule(&mut events, next, EventKind::Arrival);
                if line.len() == 1 {
                    let done = now + variates.exponential(service_rate).unwrap();
                    schedule(&mut events, done, EventKind::Departure);
                }
            },
            EventKind::Departure => {
                let arrived = line.remove(0);
                response_times.push(now - arrived);
                served += 1;
                if !line.is_empty() {
                    let done = now + variates.exponential(service_rate).unwrap();
                    schedule(&mut events, done, EventKind::Departure);
                }
            },
        }
    }
    (queue_lengths, response_times)
}

#[test]
fn single_server_matches_sorted_list_reference() {
    let seed = 11434450237083315284;
    let (queue_lengths, response_times) = sorted_list_mm1(0.8, 1.0, 3_000, seed);
    let result = run_simulation(0.8, 1.0, 1, 3_000, Some(seed)).unwrap();
    assert_eq!(queue_lengths, result.queue_lengths, "queue length snapshots diverged");
    assert_eq!(response_times, result.response_times, "response times diverged");
}

#[test]
fn observation_counts_follow_processed_events() {
    for servers in 1..=3 {
        let sim = simulate(QueueParameters::new(0.9, 0.5, servers, 2_000), Some(7 + servers as u64)).unwrap();
        let log = sim.log();
        assert_eq!(2_000, log.response_times.len());
        assert_eq!(sim.arrivals_processed() + 2_000, log.queue_lengths.len());
        assert_eq!(sim.events_processed(), log.queue_lengths.len());
        assert!(log.queue_lengths.len() >= 4_000);
    }
}

#[test]
fn response_times_are_nonnegative() {
    let result = run_simulation(1.5, 1.0, 2, 5_000, Some(3)).unwrap();
    assert!(result.response_times.iter().all(|&r| r >= 0.0));
}

#[test]
fn clock_never_runs_backwards() {
    let mut sim = Simulation::new(QueueParameters::new(0.8, 1.0, 2, 5_000), Variates::from_seed(13)).unwrap();
    let mut last = 0.0;
    while let Some(event) = sim.step().unwrap() {
        assert!(event.time >= last, "event at {} popped after {}", event.time, last);
        assert_eq!(event.time, sim.clock());
        last = event.time;
    }
    assert_eq!(RunState::Done, sim.run_state());
}

#[test]
fn unstable_system_still_simulates() {
    assert!(matches!(theoretical_mmc(1.2, 1.0, 1), Err(Error::Unstable { .. })));

    let result = run_simulation(1.2, 1.0, 1, 2_000, Some(5)).unwrap();
    assert_eq!(2_000, result.response_times.len());
    // the line keeps growing, so late customers wait far longer than early ones
    let early: f64 = result.response_times[..200].iter().sum::<f64>() / 200.0;
    let late: f64 = result.response_times[1_800..].iter().sum::<f64>() / 200.0;
    assert!(late > early, "late mean {late} should exceed early mean {early}");
}

#[test]
fn same_seed_is_bit_identical() {
    let first = run_simulation(0.8, 1.0, 2, 5_000, Some(99)).unwrap();
    let second = run_simulation(0.8, 1.0, 2, 5_000, Some(99)).unwrap();
    assert_eq!(first, second);

    let other = run_simulation(0.8, 1.0, 2, 5_000, Some(100)).unwrap();
    assert_ne!(first.response_times, other.response_times);
}

#[test]
fn single_server_converges_to_theory() {
    let theory = theoretical_mmc(0.5, 1.0, 1).unwrap();
    let result = run_simulation(0.5, 1.0, 1, 100_000, Some(7082446179938253086)).unwrap();

    assert!(
        (result.service_utilization - theory.rho).abs() < 0.05,
        "busy fraction {} too far from {}",
        result.service_utilization,
        theory.rho
    );
    assert_floats_near_equal!(theory.w, result.avg_response_time, 0.1, "mean time in system off");
    // time in system per unit time is L = λW by Little's law, not ρ
    assert_floats_near_equal!(theory.l, result.utilization, 0.1, "time-in-system ratio off");
}

#[test]
fn single_server_ten_thousand_customers_near_theory() {
    let theory = theoretical_mmc(0.5, 1.0, 1).unwrap();
    let result = run_simulation(0.5, 1.0, 1, 10_000, Some(11434450237083315284)).unwrap();

    assert!(
        (result.service_utilization - theory.rho).abs() < 0.05,
        "busy fraction {} too far from {}",
        result.service_utilization,
        theory.rho
    );
    assert_floats_near_equal!(theory.w, result.avg_response_time, 0.1, "mean time in system off");
}

#[test]
fn second_server_shortens_the_queue() {
    let one = run_simulation(0.8, 1.0, 1, 10_000, Some(13009076887838060007)).unwrap();
    let two = run_simulation(0.8, 1.0, 2, 10_000, Some(13009076887838060007)).unwrap();
    assert!(
        two.avg_queue_length < one.avg_queue_length,
        "M/M/2 queue {} not shorter than M/M/1 queue {}",
        two.avg_queue_length,
        one.avg_queue_length
    );
    assert!(two.avg_response_time < one.avg_response_time);
}

#[test]
fn zero_customers_returns_empty_traces() {
    let sim = simulate(QueueParameters::new(0.8, 1.0, 1, 0), Some(1)).unwrap();
    assert!(sim.log().queue_lengths.is_empty());
    assert!(sim.log().response_times.is_empty());
    assert_eq!(0.0, sim.clock());

    assert!(matches!(
        run_simulation(0.8, 1.0, 1, 0, Some(1)),
        Err(Error::InsufficientData { .. })
    ));
}

#[test]
fn lone_customer_response_is_its_service_time() {
    let seed = 4242;
    let result = run_simulation(0.5, 2.0, 1, 1, Some(seed)).unwrap();

    let mut variates = Variates::from_seed(seed);
    let first_arrival = variates.exponential(0.5).unwrap();
    let _next_arrival = variates.exponential(0.5).unwrap();
    let service = variates.exponential(2.0).unwrap();

    assert_eq!(1, result.response_times.len());
    assert!(
        (result.response_times[0] - service).abs() <= 1e-12 * first_arrival.max(1.0),
        "response {} differs from service draw {}",
        result.response_times[0],
        service
    );
    assert_eq!(0, result.queue_lengths[0], "customer arrived to a non-empty system");
}

#[test]
fn invalid_parameters_fail_before_running() {
    for (arrival, service, servers) in [(0.0, 1.0, 1), (1.0, 0.0, 1), (-1.0, 1.0, 1), (1.0, 1.0, 0)] {
        assert!(matches!(
            run_simulation(arrival, service, servers, 10, Some(1)),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
