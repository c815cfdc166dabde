// ---------------------------------------------------------
// WebSocket session: one connection, processed in arrival order
// ---------------------------------------------------------

use crate::telemetry_dashboard::Dashboard;
use anyhow::Context;
use futures::{SinkExt, Stream, StreamExt};
use std::future::Future;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Close frame or end of stream from the producer.
    ClosedByServer,
    /// Ctrl-C on our side.
    Interrupted,
}

/// Drive one session until the stream ends or `shutdown` resolves.
///
/// Text frames feed the dashboard; `redraw` runs after every stored reading and
/// every operator command.
pub async fn pump<S, F>(
    mut inbound: S,
    dashboard: &mut Dashboard,
    mut commands: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
    mut redraw: F,
) -> anyhow::Result<SessionEnd>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
    F: FnMut(&Dashboard),
{
    tokio::pin!(shutdown);
    let mut commands_open = true;

    loop {
        tokio::select! {
            item = inbound.next() => {
                match item {
                    Some(Ok(Message::Text(text))) => {
                        if dashboard.on_message(text.as_str()) {
                            redraw(&*dashboard);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("server closed the connection: {frame:?}");
                        return Ok(SessionEnd::ClosedByServer);
                    }
                    // Binary, ping and pong frames carry no readings.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("websocket read failed"),
                    None => return Ok(SessionEnd::ClosedByServer),
                }
            }

            line = commands.recv(), if commands_open => {
                match line {
                    Some(line) => {
                        dashboard.handle_input(&line);
                        redraw(&*dashboard);
                    }
                    // stdin closed; keep streaming.
                    None => commands_open = false,
                }
            }

            _ = &mut shutdown => return Ok(SessionEnd::Interrupted),
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Connect to `url` and run the session. The socket is released on return.
pub async fn run<F>(
    url: &str,
    dashboard: &mut Dashboard,
    commands: mpsc::Receiver<String>,
    redraw: F,
) -> anyhow::Result<SessionEnd>
where
    F: FnMut(&Dashboard),
{
    info!("connecting to {url}");
    let (ws_stream, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!("connected");

    let (mut write, read) = ws_stream.split();
    let end = pump(read, dashboard, commands, ctrl_c(), redraw).await;

    if let Ok(SessionEnd::Interrupted) = end {
        // Best effort; the socket is dropped either way.
        let _ = write.send(Message::Close(None)).await;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicemon_shared::DeviceId;
    use futures::stream;

    fn text(s: &str) -> Result<Message, WsError> {
        Ok(Message::text(s.to_string()))
    }

    fn no_commands() -> mpsc::Receiver<String> {
        mpsc::channel(1).1
    }

    fn voltages(dashboard: &Dashboard, device: &str) -> Vec<u32> {
        let id: DeviceId = device.parse().unwrap();
        dashboard
            .store()
            .series(&id)
            .map(|s| s.as_slice().iter().map(|r| r.voltage).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn ingests_frames_in_arrival_order_until_the_stream_ends() {
        let inbound = stream::iter(vec![
            text("D1V10C20T30"),
            text("D2V5C6T7"),
            text("garbage"),
            Ok(Message::Ping(Vec::new().into())),
            text("D1V11C21T31"),
        ]);
        let mut dashboard = Dashboard::new(DeviceId::defaults());
        let mut redraws = 0;

        let end = pump(
            inbound,
            &mut dashboard,
            no_commands(),
            std::future::pending::<()>(),
            |_| redraws += 1,
        )
        .await
        .unwrap();

        assert_eq!(end, SessionEnd::ClosedByServer);
        assert_eq!(voltages(&dashboard, "D1"), vec![10, 11]);
        assert_eq!(voltages(&dashboard, "D2"), vec![5]);
        // The malformed frame and the ping do not redraw.
        assert_eq!(redraws, 3);
    }

    #[tokio::test]
    async fn close_frame_ends_the_session_before_later_frames() {
        let inbound = stream::iter(vec![
            text("D1V1C1T1"),
            Ok(Message::Close(None)),
            text("D1V2C2T2"),
        ]);
        let mut dashboard = Dashboard::new(DeviceId::defaults());

        let end = pump(inbound, &mut dashboard, no_commands(), std::future::pending::<()>(), |_| {})
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::ClosedByServer);
        assert_eq!(voltages(&dashboard, "D1"), vec![1]);
    }

    #[tokio::test]
    async fn transport_errors_are_reported() {
        let inbound = stream::iter(vec![text("D1V1C1T1"), Err(WsError::ConnectionClosed)]);
        let mut dashboard = Dashboard::new(DeviceId::defaults());

        let result = pump(
            inbound,
            &mut dashboard,
            no_commands(),
            std::future::pending::<()>(),
            |_| {},
        )
        .await;

        assert!(result.is_err());
        assert_eq!(voltages(&dashboard, "D1"), vec![1]);
    }

    #[tokio::test]
    async fn shutdown_interrupts_an_idle_session() {
        let mut dashboard = Dashboard::new(DeviceId::defaults());

        let end = pump(
            stream::pending::<Result<Message, WsError>>(),
            &mut dashboard,
            no_commands(),
            std::future::ready(()),
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
    }

    #[tokio::test]
    async fn operator_commands_switch_tabs_while_streaming() {
        let (tx, rx) = mpsc::channel(4);
        tx.send("next".to_string()).await.unwrap();
        drop(tx);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);
        let mut dashboard = Dashboard::new(DeviceId::defaults());

        // Stop as soon as the command has been applied.
        let end = pump(
            stream::pending::<Result<Message, WsError>>(),
            &mut dashboard,
            rx,
            async {
                let _ = stop_rx.await;
            },
            |d| {
                if d.selected_device().map(DeviceId::as_str) == Some("D2") {
                    if let Some(tx) = stop_tx.take() {
                        let _ = tx.send(());
                    }
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(dashboard.selected_device().map(DeviceId::as_str), Some("D2"));
    }
}
