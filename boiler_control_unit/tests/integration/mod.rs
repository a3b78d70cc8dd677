mod cycle_runner;
mod failures;
mod safety_stop;
mod support;
