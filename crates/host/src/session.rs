//! Command session: one container driven by protocol commands.

use std::path::PathBuf;

use panestack_core_layout::{
    Container, DragPhase, DragSample, GestureOutcome, PaneDescriptor, PaneRole,
    ViewportMetrics, Visibility,
};
use panestack_ipc::{IpcCommand, IpcResponse, LayoutSnapshot, PaneInfo, PaneSlot, SlotRole};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Host-side state: the container and the configuration it was built from.
#[derive(Debug)]
pub struct Session {
    container: Container<String>,
    config: Config,
    config_path: Option<PathBuf>,
}

impl Session {
    /// Build a session from a validated configuration.
    ///
    /// `config_path` is re-read on `reload`; without one the standard
    /// locations are searched again.
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let container_config = config.container_config().unwrap_or_else(|e| {
            warn!("Invalid layout config ({}), using defaults", e);
            Default::default()
        });
        let mut container = Container::new(config.initial_panes(), container_config);
        container.tick(&config.viewport_metrics());

        info!(
            "Session ready: {} pane(s), pane width {}, tab width {}, viewport {}x{}",
            container.panes().len(),
            container_config.pane_width,
            container_config.tab_width,
            container.viewport().width,
            container.viewport().height
        );

        Self {
            container,
            config,
            config_path,
        }
    }

    /// The container being driven.
    pub fn container(&self) -> &Container<String> {
        &self.container
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one command and produce its response.
    pub fn handle_command(&mut self, cmd: IpcCommand) -> IpcResponse {
        match cmd {
            IpcCommand::OpenPane { id, title } => {
                if id.trim().is_empty() {
                    return IpcResponse::error("Pane id must not be empty");
                }
                let title = if title.is_empty() { id.clone() } else { title };
                self.container.open_pane(PaneDescriptor::new(id, title.clone(), title));
                IpcResponse::Ok
            }
            IpcCommand::ClosePane { id } => {
                self.container.close_pane(&id);
                IpcResponse::Ok
            }
            IpcCommand::Resize { width, height } => {
                if !(width.is_finite() && height.is_finite()) {
                    return IpcResponse::error(format!(
                        "Invalid viewport size {}x{}",
                        width, height
                    ));
                }
                let applied = self.container.tick(&ViewportMetrics::new(width, height));
                debug!(
                    "Resize to {}x{} ({} navigation request(s) applied)",
                    width, height, applied
                );
                IpcResponse::Ok
            }
            IpcCommand::Drag {
                offset,
                direction,
                active,
            } => {
                if !offset.is_finite() {
                    return IpcResponse::error(format!("Invalid drag offset {}", offset));
                }
                let sample = if active {
                    DragSample::moving(offset, direction)
                } else {
                    DragSample::released(offset)
                };
                let outcome = self.container.drag(sample);
                log_outcome("Drag", outcome);
                IpcResponse::Ok
            }
            IpcCommand::Wheel { delta } => {
                if !delta.is_finite() {
                    return IpcResponse::error(format!("Invalid wheel delta {}", delta));
                }
                let outcome = self.container.wheel(delta);
                log_outcome("Wheel", outcome);
                IpcResponse::Ok
            }
            IpcCommand::CancelGesture => {
                let outcome = self.container.cancel_gesture();
                log_outcome("Cancel", outcome);
                IpcResponse::Ok
            }
            IpcCommand::QueryLayout => IpcResponse::Layout(self.snapshot()),
            IpcCommand::QueryPanes => IpcResponse::Panes {
                panes: self
                    .container
                    .panes()
                    .as_slice()
                    .iter()
                    .map(|pane| PaneInfo {
                        id: pane.id.clone(),
                        title: pane.title.clone(),
                    })
                    .collect(),
            },
            IpcCommand::Reload => match Config::load_with(self.config_path.as_deref()) {
                Ok(new_config) => {
                    self.apply_config(new_config);
                    IpcResponse::Ok
                }
                Err(e) => IpcResponse::error(format!("Failed to reload config: {:#}", e)),
            },
            IpcCommand::Stop => {
                // The event loop exits after sending this response.
                IpcResponse::Ok
            }
        }
    }

    /// Validate and apply a new configuration.
    ///
    /// Only the widths are applied: open panes and the live viewport are
    /// runtime state and survive a reload.
    pub fn apply_config(&mut self, mut config: Config) {
        for w in config.validate() {
            warn!("Config: {} - {}", w.field, w.message);
        }
        match config.container_config() {
            Ok(container_config) => self.container.set_config(container_config),
            Err(e) => warn!("Ignoring layout config: {}", e),
        }
        info!("Configuration reloaded");
        self.config = config;
    }

    /// Layout state in protocol form.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let partition = self.container.partition();
        let frame = self.container.frame();
        let controller = self.container.controller();

        let slots = frame
            .placements
            .iter()
            .zip(self.container.panes().as_slice())
            .map(|(placement, pane)| PaneSlot {
                id: placement.pane_id.clone(),
                title: pane.title.clone(),
                role: slot_role(placement.role),
                x: placement.rect.x,
                width: placement.rect.width,
                visible: placement.visibility == Visibility::Visible,
                in_refuge: placement.in_refuge,
            })
            .collect();

        LayoutSnapshot {
            left_tabs: ids(partition.left_tabs),
            pinned: partition.pinned_id().map(str::to_string),
            track: ids(partition.track),
            right_tabs: ids(partition.right_tabs),
            track_offset: frame.allocation.track_offset,
            resting_shift: frame.allocation.resting_shift(),
            x: frame.offset.x,
            min: frame.offset.min,
            max: frame.offset.max,
            phase: phase_name(frame.phase).to_string(),
            tab_offset: controller.tab_offset(),
            viewport_width: frame.viewport.width,
            slots,
        }
    }
}

fn ids(segment: &[PaneDescriptor<String>]) -> Vec<String> {
    segment.iter().map(|pane| pane.id.clone()).collect()
}

fn slot_role(role: PaneRole) -> SlotRole {
    match role {
        PaneRole::LeftTab => SlotRole::LeftTab,
        PaneRole::Pinned => SlotRole::Pinned,
        PaneRole::Track => SlotRole::Track,
        PaneRole::RightTab => SlotRole::RightTab,
    }
}

fn phase_name(phase: DragPhase) -> &'static str {
    match phase {
        DragPhase::Resting => "resting",
        DragPhase::Dragging => "dragging",
        DragPhase::Refuge { .. } => "refuge",
    }
}

fn log_outcome(source: &str, outcome: GestureOutcome) {
    match outcome {
        GestureOutcome::Committed(side) => info!("{}: committed tab from {:?} edge", source, side),
        other => debug!("{}: {:?}", source, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaneConfig;

    fn session(ids: &[&str], pane_width: f64, viewport_width: f64) -> Session {
        let mut config = Config::default();
        config.layout.pane_width = pane_width;
        config.viewport.width = viewport_width;
        config.viewport.height = 600.0;
        config.panes = ids
            .iter()
            .map(|id| PaneConfig {
                id: id.to_string(),
                title: id.to_uppercase(),
            })
            .collect();
        Session::new(config, None)
    }

    fn layout(session: &mut Session) -> LayoutSnapshot {
        match session.handle_command(IpcCommand::QueryLayout) {
            IpcResponse::Layout(snapshot) => snapshot,
            other => panic!("Expected layout, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_panes_from_config() {
        let mut s = session(&["a", "b", "c"], 300.0, 300.0);
        let snap = layout(&mut s);

        assert_eq!(snap.left_tabs, vec!["a", "b"]);
        assert_eq!(snap.pinned.as_deref(), Some("c"));
        assert!(snap.track.is_empty());
        assert_eq!(snap.track_offset, 0.0);
        assert_eq!(snap.phase, "resting");
        assert_eq!(snap.slots[0].role, SlotRole::LeftTab);
        assert_eq!(snap.slots[0].title, "A");
    }

    #[test]
    fn test_open_and_close() {
        let mut s = session(&[], 400.0, 1600.0);
        for id in ["a", "b", "c"] {
            let resp = s.handle_command(IpcCommand::OpenPane {
                id: id.to_string(),
                title: String::new(),
            });
            assert_eq!(resp, IpcResponse::Ok);
        }
        assert_eq!(
            s.handle_command(IpcCommand::ClosePane { id: "b".to_string() }),
            IpcResponse::Ok
        );
        assert_eq!(
            s.handle_command(IpcCommand::ClosePane { id: "zzz".to_string() }),
            IpcResponse::Ok
        );

        match s.handle_command(IpcCommand::QueryPanes) {
            IpcResponse::Panes { panes } => {
                let ids: Vec<&str> = panes.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(ids, vec!["a", "c"]);
                assert_eq!(panes[0].title, "a");
            }
            other => panic!("Expected panes, got {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_empty_id() {
        let mut s = session(&[], 400.0, 800.0);
        let resp = s.handle_command(IpcCommand::OpenPane {
            id: "  ".to_string(),
            title: "x".to_string(),
        });
        assert!(matches!(resp, IpcResponse::Error { .. }));
        assert!(s.container().panes().is_empty());
    }

    #[test]
    fn test_drag_commits_tab() {
        let mut s = session(&["a", "b", "c", "d", "e", "f"], 300.0, 700.0);
        s.handle_command(IpcCommand::Drag {
            offset: 400.0,
            direction: 1,
            active: true,
        });
        s.handle_command(IpcCommand::Drag {
            offset: 400.0,
            direction: 0,
            active: false,
        });

        let snap = layout(&mut s);
        assert_eq!(snap.tab_offset, 1);
        assert_eq!(snap.left_tabs, vec!["a", "b", "c"]);
        assert_eq!(snap.pinned.as_deref(), Some("d"));
        assert_eq!(snap.right_tabs, vec!["f"]);
        assert_eq!(snap.phase, "resting");
    }

    #[test]
    fn test_drag_in_refuge_reports_phase() {
        let mut s = session(&["a", "b", "c", "d", "e", "f"], 300.0, 700.0);
        s.handle_command(IpcCommand::Drag {
            offset: 130.0,
            direction: 1,
            active: true,
        });

        let snap = layout(&mut s);
        assert_eq!(snap.phase, "refuge");
        assert!(snap.x >= snap.min && snap.x <= snap.max);
        assert!(snap.slots.iter().any(|slot| slot.in_refuge && slot.id == "d"));

        s.handle_command(IpcCommand::CancelGesture);
        let snap = layout(&mut s);
        assert_eq!(snap.phase, "resting");
        assert_eq!(snap.tab_offset, 0);
        assert_eq!(snap.x, snap.min);
        assert_eq!(snap.resting_shift, 60.0);
        assert_eq!(snap.x, -snap.resting_shift);
        // max(0, 300 - (700 - 4 * 40))
        assert_eq!(snap.track_offset, 0.0);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut s = session(&["a"], 400.0, 800.0);
        assert!(matches!(
            s.handle_command(IpcCommand::Wheel { delta: f64::NAN }),
            IpcResponse::Error { .. }
        ));
        assert!(matches!(
            s.handle_command(IpcCommand::Resize {
                width: f64::INFINITY,
                height: 10.0
            }),
            IpcResponse::Error { .. }
        ));
        assert!(matches!(
            s.handle_command(IpcCommand::Drag {
                offset: f64::NAN,
                direction: 1,
                active: true
            }),
            IpcResponse::Error { .. }
        ));
    }

    #[test]
    fn test_resize_relayouts() {
        let mut s = session(&["a", "b", "c"], 300.0, 1200.0);
        assert!(layout(&mut s).left_tabs.is_empty());

        s.handle_command(IpcCommand::Resize {
            width: 300.0,
            height: 600.0,
        });
        let snap = layout(&mut s);
        assert_eq!(snap.left_tabs.len(), 2);
        assert_eq!(snap.viewport_width, 300.0);
    }

    #[test]
    fn test_apply_config_keeps_panes() {
        let mut s = session(&["a", "b", "c"], 400.0, 800.0);
        assert_eq!(s.container().allocation().collapsed(), 1);

        let mut config = Config::default();
        config.layout.pane_width = 200.0;
        s.apply_config(config);

        assert_eq!(s.container().panes().len(), 3);
        assert_eq!(s.container().allocation().collapsed(), 0);
        assert_eq!(s.container().viewport().width, 800.0);
        assert_eq!(s.config().layout.pane_width, 200.0);
    }

    #[test]
    fn test_reload_missing_file_is_error() {
        let path = std::env::temp_dir().join("panestack-session-missing.toml");
        let _ = std::fs::remove_file(&path);
        let mut s = Session::new(Config::default(), Some(path));
        assert!(matches!(
            s.handle_command(IpcCommand::Reload),
            IpcResponse::Error { .. }
        ));
    }

    #[test]
    fn test_stop_is_ok() {
        let mut s = session(&[], 400.0, 800.0);
        assert_eq!(s.handle_command(IpcCommand::Stop), IpcResponse::Ok);
    }
}
