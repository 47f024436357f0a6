use std::time::Duration;

/// Forecast-alignment failures.
///
/// These are not retryable: the caller must wait for better forecast data.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum AlignmentError {
    #[error("the {0} series is empty")]
    EmptySeries(&'static str),

    #[error("no usable scheduling slots remain after alignment")]
    EmptyHorizon,
}

/// Everything that can go wrong between raw forecasts and a dispatch schedule.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// The constraints cannot be jointly satisfied, for example an
    /// end-of-horizon target that is unreachable within the power limits.
    /// Not retryable without relaxing the parameters.
    #[error("the dispatch model is infeasible: {report}")]
    Infeasible { report: String },

    /// No solution within the wall-clock budget; retryable with a larger one.
    #[error("no solution found within the {limit:?} time limit: {report}")]
    Timeout { limit: Duration, report: String },

    /// The solver itself cannot run. Fatal for the current process.
    #[error("the MILP solver cannot be invoked: {report}")]
    SolverUnavailable { report: String },
}
