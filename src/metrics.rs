//! Usage-event recording. Each command reports which operation ran, nothing
//! else. The sink is kept behind this seam so the transport can change
//! without touching the command flows; right now events land in the debug
//! log only.

pub fn send_event(name: &str) {
    log::debug!("usage event: {}", name);
}
