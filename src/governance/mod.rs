//! Operational gate, airline admission and the flight registry.

pub mod airline;
pub mod flights;
pub mod gate;

pub use airline::{
    Airline, AirlineGovernance, AirlineStatus, FundingOutcome, RegistrationInfo,
    RegistrationOutcome,
};
pub use flights::{Flight, FlightRegistry};
pub use gate::OperationalGate;

#[cfg(test)]
mod tests;
