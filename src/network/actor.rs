//! Network actor - registers header-override rules and runs HTTP dispatch
//! tasks in the Tokio runtime

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::info;

use crate::messages::dispatch::{DispatchCommand, DispatchEvent, HeaderRule};
use crate::network::client::{create_client, execute_plan};

pub struct DispatchActor {
    client: reqwest::Client,
    event_tx: mpsc::UnboundedSender<DispatchEvent>,
    /// Override rules registered per URL. A new dispatch to the same URL
    /// replaces the old rules; they stay registered otherwise.
    override_rules: HashMap<String, Vec<HeaderRule>>,
    in_flight: JoinSet<()>,
}

impl DispatchActor {
    pub fn new(event_tx: mpsc::UnboundedSender<DispatchEvent>) -> Self {
        DispatchActor {
            client: create_client(),
            event_tx,
            override_rules: HashMap::new(),
            in_flight: JoinSet::new(),
        }
    }

    /// Run the dispatch actor message loop.
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<DispatchCommand>) {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(DispatchCommand::Execute { tab_id, plan }) => {
                            // Registration completes before the request task
                            // exists, so the rewrites always apply to it.
                            if !plan.overrides.is_empty() {
                                self.override_rules
                                    .insert(plan.url.clone(), plan.overrides.clone());
                            }
                            let rules = self
                                .override_rules
                                .get(&plan.url)
                                .cloned()
                                .unwrap_or_default();
                            let client = self.client.clone();
                            let event_tx = self.event_tx.clone();
                            self.in_flight.spawn(async move {
                                info!(tab = %tab_id, method = %plan.method, url = %plan.url, "dispatching");
                                let outcome = execute_plan(&client, plan, rules).await;
                                let _ = event_tx.send(DispatchEvent { tab_id, outcome });
                            });
                        }
                        Some(DispatchCommand::Shutdown) | None => break,
                    }
                }
                Some(_result) = self.in_flight.join_next() => {
                    // task already sent its outcome
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::dispatch::{BodyPlan, DispatchOutcome, DispatchPlan};
    use crate::models::HttpMethod;

    #[tokio::test]
    async fn test_unreachable_host_reports_failure_for_its_tab() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(DispatchActor::new(event_tx).run(cmd_rx));

        cmd_tx
            .send(DispatchCommand::Execute {
                tab_id: "t1".to_string(),
                plan: DispatchPlan {
                    method: HttpMethod::GET,
                    url: "http://127.0.0.1:1/".to_string(),
                    headers: vec![],
                    overrides: vec![],
                    body: BodyPlan::Empty,
                },
            })
            .unwrap();

        let event = event_rx.recv().await.unwrap();
        assert_eq!(event.tab_id, "t1");
        assert!(matches!(event.outcome, DispatchOutcome::Failed(_)));
    }
}
