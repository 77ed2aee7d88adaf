use crate::metrics::{Metrics, ObservationLog};
use crate::timeline::{Event, EventKind, EventTimeline};
use crate::variates::Variates;
use crate::{Error, Result};

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, error, info, info_span, trace};

/// The inputs that define an M/M/c run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueParameters {
    /// Mean customer arrivals per unit time (λ).
    pub arrival_rate: f64,
    /// Mean completions per unit time at a single server (μ).
    pub service_rate: f64,
    /// Number of parallel servers (c).
    pub server_count: usize,
    /// The run ends once this many customers have departed.
    pub total_customers: usize,
}

impl QueueParameters {
    pub fn new(arrival_rate: f64, service_rate: f64, server_count: usize, total_customers: usize) -> Self {
        Self {
            arrival_rate,
            service_rate,
            server_count,
            total_customers,
        }
    }

    /// Check that both rates are finite and strictly positive and that at least one server exists.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_rate("arrival_rate", self.arrival_rate)?;
        validate_rate("service_rate", self.service_rate)?;
        if self.server_count == 0 {
            return Err(Error::invalid("server_count", self.server_count));
        }
        Ok(())
    }

    /// Offered load per server, λ / (c·μ).
    pub fn traffic_intensity(&self) -> f64 {
        self.arrival_rate / (self.server_count as f64 * self.service_rate)
    }
}

pub(crate) fn validate_rate(name: &'static str, rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, rate))
    }
}

/// Customers currently in the system and the servers attending to them.
///
/// Arrival timestamps are kept in FIFO order. The first `servers_busy` entries are in service and the rest are waiting,
/// so `servers_busy <= min(server_count, len())` holds at all times.
#[derive(Debug, Clone)]
pub struct QueueState {
    customers: VecDeque<f64>,
    servers_busy: usize,
    server_count: usize,
}

impl QueueState {
    pub fn new(server_count: usize) -> Self {
        Self {
            customers: VecDeque::new(),
            servers_busy: 0,
            server_count,
        }
    }

    /// Customers in the system, waiting or in service.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Customers in line who have not reached a server yet.
    pub fn waiting(&self) -> usize {
        self.customers.len() - self.servers_busy
    }

    pub fn servers_busy(&self) -> usize {
        self.servers_busy
    }

    pub fn server_count(&self) -> usize {
        self.server_count
    }

    pub fn has_idle_server(&self) -> bool {
        self.servers_busy < self.server_count
    }

    fn push_arrival(&mut self, time: f64) {
        self.customers.push_back(time);
    }

    /// Move the head of the waiting line to a server. Returns false if nobody is waiting or every server is busy.
    fn start_service(&mut self) -> bool {
        if self.waiting() == 0 || !self.has_idle_server() {
            return false;
        }
        self.servers_busy += 1;
        true
    }

    /// Release one server and remove the oldest customer, returning that customer's arrival time.
    fn complete_service(&mut self) -> Option<f64> {
        if self.servers_busy == 0 {
            return None;
        }
        let arrival_time = self.customers.pop_front()?;
        self.servers_busy -= 1;
        Some(arrival_time)
    }
}

/// Whether a [`Simulation`] will process more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Done,
}

/// A discrete-event simulation of one M/M/c queue.
///
/// A [`Simulation`] owns its timeline, queue state, observation log and random-variate generator, so independent runs
/// never share mutable data. The expected workflow is:
///
/// 1. Build [`QueueParameters`] and a [`Variates`] generator.
/// 2. Pass both to [`new()`], which validates the parameters and schedules the first arrival.
/// 3. Call [`run()`] (or [`step()`] repeatedly). Handle any error it might return.
/// 4. Read the raw traces through [`log()`] or reduce them with [`metrics()`] / [`into_result()`].
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`step()`]: Simulation::step
/// [`log()`]: Simulation::log
/// [`metrics()`]: Simulation::metrics
/// [`into_result()`]: Simulation::into_result
#[derive(Debug)]
pub struct Simulation {
    parameters: QueueParameters,
    timeline: EventTimeline,
    state: QueueState,
    log: ObservationLog,
    variates: Variates,
    customers_served: usize,
    arrivals_processed: usize,
    events_processed: usize,
    busy_server_time: f64,
    run_state: RunState,
}

impl Simulation {
    /// Validate `parameters` and prepare a run starting at time zero.
    ///
    /// Unless `total_customers` is zero, the first arrival is drawn and scheduled here. A zero-customer simulation
    /// starts out [`RunState::Done`] with an empty timeline.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidParameter`] if a rate is not strictly positive or there are no servers.
    pub fn new(parameters: QueueParameters, variates: Variates) -> Result<Self> {
        parameters.validate()?;

        let mut simulation = Self {
            parameters,
            timeline: EventTimeline::new(0.0),
            state: QueueState::new(parameters.server_count),
            log: ObservationLog::with_capacity(parameters.total_customers),
            variates,
            customers_served: 0,
            arrivals_processed: 0,
            events_processed: 0,
            busy_server_time: 0.0,
            run_state: RunState::Done,
        };

        if parameters.total_customers > 0 {
            simulation.run_state = RunState::Running;
            simulation.schedule_arrival()?;
        }
        Ok(simulation)
    }

    /// Process events until the target number of customers has departed.
    ///
    /// Events still on the timeline at that point are left unprocessed.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTimeline`], [`Error::LogicError`] or [`Error::BackInTime`] if an engine invariant breaks. These
    /// are logged with the run's context before being returned.
    pub fn run(&mut self) -> Result<()> {
        self.run_until(|_| false).map(|_| ())
    }

    /// Process events until the run is done or `should_stop` returns true. `should_stop` is consulted before each
    /// event, which gives long runs a cooperative cancellation point.
    ///
    /// Returns the run state at the point the loop exited.
    ///
    /// # Errors
    ///
    /// See [`run()`](Simulation::run).
    pub fn run_until<F>(&mut self, mut should_stop: F) -> Result<RunState>
    where
        F: FnMut(&Simulation) -> bool,
    {
        let span = info_span!(
            "simulation",
            arrival_rate = self.parameters.arrival_rate,
            service_rate = self.parameters.service_rate,
            servers = self.parameters.server_count,
            customers = self.parameters.total_customers
        );
        let _entered = span.enter();
        info!(start_time = self.clock(), "simulation started");

        while self.run_state == RunState::Running {
            if should_stop(self) {
                info!(
                    clock = self.clock(),
                    customers_served = self.customers_served,
                    "simulation stopped early"
                );
                return Ok(RunState::Running);
            }
            self.step()?;
        }

        info!(
            final_time = self.clock(),
            events_processed = self.events_processed,
            customers_served = self.customers_served,
            "simulation completed"
        );
        Ok(RunState::Done)
    }

    /// Pop and process the earliest scheduled event, returning it. Returns `None` without touching the timeline once
    /// the run is done.
    ///
    /// # Errors
    ///
    /// See [`run()`](Simulation::run).
    pub fn step(&mut self) -> Result<Option<Event>> {
        if self.run_state == RunState::Done {
            return Ok(None);
        }

        let previous_time = self.timeline.current_time();
        let event = self.timeline.pop_earliest().map_err(|e| self.abort(e))?;

        self.busy_server_time += self.state.servers_busy() as f64 * (event.time - previous_time);
        self.log.queue_lengths.push(self.state.len());
        self.events_processed += 1;
        trace!(
            time = event.time,
            kind = %event.kind,
            in_system = self.state.len(),
            busy = self.state.servers_busy(),
            "processing event"
        );

        match event.kind {
            EventKind::Arrival => self.handle_arrival(event.time)?,
            EventKind::Departure => self.handle_departure(event.time)?,
        }

        if self.customers_served == self.parameters.total_customers {
            self.run_state = RunState::Done;
        }
        Ok(Some(event))
    }

    fn handle_arrival(&mut self, now: f64) -> Result<()> {
        self.state.push_arrival(now);
        self.arrivals_processed += 1;
        self.schedule_arrival()?;

        if self.state.has_idle_server() {
            self.start_service()?;
        }
        Ok(())
    }

    fn handle_departure(&mut self, now: f64) -> Result<()> {
        let arrival_time = self
            .state
            .complete_service()
            .ok_or_else(|| self.logic_error("departure with no customer in service"))?;

        self.log.response_times.push(now - arrival_time);
        self.customers_served += 1;

        if self.state.waiting() > 0 {
            self.start_service()?;
        }
        Ok(())
    }

    fn schedule_arrival(&mut self) -> Result<()> {
        let delay = self.variates.exponential(self.parameters.arrival_rate)?;
        self.timeline
            .schedule_with_delay(delay, EventKind::Arrival)
            .map_err(|e| self.abort(e))
    }

    fn start_service(&mut self) -> Result<()> {
        if !self.state.start_service() {
            return Err(self.logic_error("service start with no waiting customer or no idle server"));
        }

        let service_time = self.variates.exponential(self.parameters.service_rate)?;
        debug!(
            time = self.clock(),
            service_time,
            busy = self.state.servers_busy(),
            "service started"
        );
        self.timeline
            .schedule_with_delay(service_time, EventKind::Departure)
            .map_err(|e| self.abort(e))
    }

    fn logic_error(&self, message: &'static str) -> Error {
        self.abort(Error::LogicError {
            message,
            clock: self.clock(),
            events_processed: self.events_processed,
            customers_served: self.customers_served,
        })
    }

    /// Log an invariant violation with the run's full context and hand the error back for propagation.
    fn abort(&self, error: Error) -> Error {
        error!(
            %error,
            arrival_rate = self.parameters.arrival_rate,
            service_rate = self.parameters.service_rate,
            servers = self.parameters.server_count,
            total_customers = self.parameters.total_customers,
            clock = self.clock(),
            events_processed = self.events_processed,
            customers_served = self.customers_served,
            scheduled = self.timeline.len(),
            "simulation invariant violated"
        );
        error
    }

    /// Reduce the observations recorded so far.
    ///
    /// # Errors
    ///
    /// [`Error::InsufficientData`] if nothing was recorded, [`Error::DivideByZero`] if the clock never advanced.
    pub fn metrics(&self) -> Result<Metrics> {
        Metrics::compute(
            &self.log,
            self.clock(),
            self.parameters.server_count,
            self.busy_server_time,
        )
    }

    /// Consume the simulation, producing its metrics together with the raw traces.
    ///
    /// # Errors
    ///
    /// See [`metrics()`](Simulation::metrics).
    pub fn into_result(self) -> Result<SimulationResult> {
        let metrics = self.metrics()?;
        Ok(SimulationResult {
            avg_queue_length: metrics.avg_queue_length,
            avg_response_time: metrics.avg_response_time,
            utilization: metrics.utilization,
            service_utilization: metrics.service_utilization,
            final_time: self.clock(),
            queue_lengths: self.log.queue_lengths,
            response_times: self.log.response_times,
        })
    }

    /// The time of the most recently processed event, zero before the first.
    pub fn clock(&self) -> f64 {
        self.timeline.current_time()
    }

    pub fn parameters(&self) -> &QueueParameters {
        &self.parameters
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn customers_served(&self) -> usize {
        self.customers_served
    }

    pub fn arrivals_processed(&self) -> usize {
        self.arrivals_processed
    }

    pub fn events_processed(&self) -> usize {
        self.events_processed
    }

    /// Server-time spent serving customers so far.
    pub fn busy_server_time(&self) -> f64 {
        self.busy_server_time
    }
}

impl std::fmt::Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {}", self.clock())
    }
}

/// Everything a caller gets back from [`run_simulation()`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub avg_queue_length: f64,
    pub avg_response_time: f64,
    pub utilization: f64,
    pub service_utilization: f64,
    /// Clock time of the last processed event.
    pub final_time: f64,
    pub queue_lengths: Vec<usize>,
    pub response_times: Vec<f64>,
}

/// Run an M/M/c simulation to completion and return its raw traces without reducing them.
///
/// `seed` fixes the random stream; without one the generator is seeded from entropy.
///
/// # Errors
///
/// See [`Simulation::new()`] and [`Simulation::run()`].
pub fn simulate(parameters: QueueParameters, seed: Option<u64>) -> Result<Simulation> {
    let mut simulation = Simulation::new(parameters, Variates::from_optional_seed(seed))?;
    simulation.run()?;
    Ok(simulation)
}

/// Run an M/M/c simulation to completion and summarize it.
///
/// # Errors
///
/// * [`Error::InvalidParameter`] for a non-positive rate or zero servers, before anything runs.
/// * [`Error::InsufficientData`] when `total_customers` is zero: the run finishes immediately with nothing to average.
/// * Engine invariant violations, see [`Simulation::run()`].
pub fn run_simulation(
    arrival_rate: f64,
    service_rate: f64,
    server_count: usize,
    total_customers: usize,
    seed: Option<u64>,
) -> Result<SimulationResult> {
    let parameters = QueueParameters::new(arrival_rate, service_rate, server_count, total_customers);
    simulate(parameters, seed)?.into_result()
}
