mod emergency_stop;
mod rotation;
mod safety_gate;
mod support;
