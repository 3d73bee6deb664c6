//! One-shot `timer_tick` broadcast after the surface comes up.

use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;

use crate::channels;
use crate::events::EventPublisher;

/// Publish `timer_tick` with `{message}` once, `delay` from now.
///
/// Subscribers that attach after the tick never see it.
pub fn schedule_tick(publisher: EventPublisher, delay: Duration, message: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        log::debug!("Timer fired after {:?}", delay);
        publisher.publish(channels::TIMER_TICK, json!({ "message": message }));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::wire::{link, HostMessage};
    use crate::events::TimerTick;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let (host, mut sandbox) = link();
        let publisher = EventPublisher::new(host.outbound.clone());

        let handle = schedule_tick(publisher, Duration::from_secs(1), "ready".into());
        assert!(sandbox.inbound.try_recv().is_err());

        handle.await.unwrap();
        match sandbox.inbound.recv().await.unwrap() {
            HostMessage::Event(msg) => {
                let tick: TimerTick = msg.decode().unwrap();
                assert_eq!(tick.message, "ready");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(sandbox.inbound.try_recv().is_err());
    }
}
