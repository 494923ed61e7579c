//! In-memory dashboard page.
//!
//! Each render purpose owns one container. Work for a purpose runs as a task
//! holding a [`Ticket`]; starting newer work for the same purpose aborts the
//! old task and invalidates its ticket, so stale content can never be
//! committed over fresh content.

use crate::html::{div, el, raw, text, Element, Node};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

const PULSE_CLASS: &str = "animate__pulse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    ModelInfo,
    Comparison,
    Prediction,
}

impl Purpose {
    pub fn container_id(self) -> &'static str {
        match self {
            Purpose::ModelInfo => "modelInfoContent",
            Purpose::Comparison => "comparisonContent",
            Purpose::Prediction => "resultsContent",
        }
    }
}

/// Permission to write one purpose's container, valid until superseded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    purpose: Purpose,
    generation: u64,
}

impl Ticket {
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }
}

#[derive(Default)]
struct PageState {
    containers: HashMap<Purpose, Node>,
    generations: HashMap<Purpose, u64>,
    tasks: HashMap<Purpose, AbortHandle>,
    loading: bool,
    pulse_generation: u64,
    results_card_pulsing: bool,
}

impl PageState {
    fn next_ticket(&mut self, purpose: Purpose) -> Ticket {
        let generation = self.generations.entry(purpose).or_insert(0);
        *generation += 1;
        Ticket {
            purpose,
            generation: *generation,
        }
    }

    fn holds(&self, ticket: Ticket) -> bool {
        self.generations.get(&ticket.purpose) == Some(&ticket.generation)
    }
}

pub struct Page {
    title: String,
    state: Arc<Mutex<PageState>>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate outstanding tickets for `purpose` and issue a new one
    pub fn begin(&self, purpose: Purpose) -> Ticket {
        self.state().next_ticket(purpose)
    }

    /// Replace the container's content if the ticket is still current
    pub fn commit(&self, ticket: Ticket, content: Node) -> bool {
        let mut state = self.state();
        if !state.holds(ticket) {
            debug!(purpose = ?ticket.purpose(), "dropping superseded render");
            return false;
        }
        state.containers.insert(ticket.purpose, content);
        true
    }

    /// Run `task` for `purpose`, aborting whatever task held that purpose before
    pub fn spawn<F, Fut, T>(&self, purpose: Purpose, task: F) -> JoinHandle<T>
    where
        F: FnOnce(Ticket) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        // Ticket and abort handle change under one lock; `task` must not
        // touch the page before its first await.
        let mut state = self.state();
        let ticket = state.next_ticket(purpose);
        let handle = tokio::spawn(task(ticket));
        let previous = state.tasks.insert(purpose, handle.abort_handle());
        drop(state);
        if let Some(previous) = previous {
            debug!(?purpose, "aborting superseded task");
            previous.abort();
        }
        handle
    }

    pub fn content(&self, purpose: Purpose) -> Option<String> {
        self.state().containers.get(&purpose).map(Node::to_string)
    }

    /// Show or hide the loading overlay on behalf of a still-current ticket
    pub fn set_loading(&self, ticket: Ticket, loading: bool) -> bool {
        let mut state = self.state();
        if !state.holds(ticket) {
            return false;
        }
        state.loading = loading;
        true
    }

    /// Pulse the results card for `duration`.
    ///
    /// Only the latest pulse clears the class, so back-to-back results keep
    /// their full animation.
    pub fn pulse(&self, duration: Duration) -> JoinHandle<()> {
        let pulse = {
            let mut state = self.state();
            state.pulse_generation += 1;
            state.results_card_pulsing = true;
            state.pulse_generation
        };

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.pulse_generation == pulse {
                state.results_card_pulsing = false;
            }
        })
    }

    fn container(state: &PageState, purpose: Purpose) -> Element {
        div()
            .id(purpose.container_id())
            .child(state.containers.get(&purpose).cloned())
    }

    fn results_card(state: &PageState) -> Element {
        let mut card = div()
            .id("resultsCard")
            .class("results-card animate__animated")
            .child(Self::container(state, Purpose::Prediction));
        if state.results_card_pulsing {
            card.add_class(PULSE_CLASS);
        }
        card
    }

    fn section(id: &'static str, heading: &'static str, body: Element) -> Element {
        el("section")
            .id(id)
            .class("section")
            .child(el("h2").class("section-title").child(heading))
            .child(body)
    }

    /// The whole page as a standalone HTML document
    pub fn render_document(&self) -> Node {
        let state = self.state();

        let mut overlay = div()
            .id("loadingOverlay")
            .class("loading-overlay")
            .child(div().class("spinner"));
        if state.loading {
            overlay.add_class("active");
        }

        let head = el("head")
            .child(Element::void("meta").attr("charset", "UTF-8"))
            .child(
                Element::void("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width, initial-scale=1.0"),
            )
            .child(el("title").child(text(self.title.clone())))
            .child(
                Element::void("link")
                    .attr("rel", "stylesheet")
                    .attr("href", "https://cdnjs.cloudflare.com/ajax/libs/animate.css/4.1.1/animate.min.css"),
            )
            .child(
                Element::void("link")
                    .attr("rel", "stylesheet")
                    .attr("href", "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css"),
            )
            .child(
                Element::void("link")
                    .attr("rel", "stylesheet")
                    .attr("href", "/static/css/style.css"),
            );

        let body = el("body")
            .child(overlay)
            .child(el("header").child(el("h1").child(text(self.title.clone()))))
            .child(Self::section(
                "predict",
                "Prediction Result",
                Self::results_card(&state),
            ))
            .child(Self::section(
                "model",
                "Model Information",
                div()
                    .class("model-info-grid")
                    .child(Self::container(&state, Purpose::ModelInfo)),
            ))
            .child(Self::section(
                "comparison",
                "Model Comparison",
                Self::container(&state, Purpose::Comparison),
            ));

        Node::Fragment(vec![
            raw("<!DOCTYPE html>"),
            el("html").attr("lang", "en").child(head).child(body).into(),
        ])
    }
}

#[cfg(test)]
impl Page {
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state().holds(ticket)
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_pulsing(&self) -> bool {
        self.state().results_card_pulsing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_with_current_ticket() {
        let page = Page::new("Test");
        let ticket = page.begin(Purpose::ModelInfo);
        assert!(page.commit(ticket, text("loaded")));
        assert_eq!(page.content(Purpose::ModelInfo).as_deref(), Some("loaded"));
        assert_eq!(page.content(Purpose::Comparison), None);
    }

    #[test]
    fn test_superseded_ticket_cannot_commit() {
        let page = Page::new("Test");
        let stale = page.begin(Purpose::Prediction);
        let fresh = page.begin(Purpose::Prediction);

        assert!(page.commit(fresh, text("fresh")));
        assert!(!page.commit(stale, text("stale")));
        assert!(!page.is_current(stale));
        assert_eq!(page.content(Purpose::Prediction).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_purposes_are_independent() {
        let page = Page::new("Test");
        let info = page.begin(Purpose::ModelInfo);
        let _comparison = page.begin(Purpose::Comparison);
        assert!(page.is_current(info));
        assert_eq!(info.purpose(), Purpose::ModelInfo);
    }

    #[tokio::test]
    async fn test_spawn_aborts_previous_task_for_purpose() {
        let page = Arc::new(Page::new("Test"));

        let slow_page = Arc::clone(&page);
        let slow = page.spawn(Purpose::Prediction, move |ticket| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            slow_page.commit(ticket, text("slow"))
        });

        let fast_page = Arc::clone(&page);
        let fast = page.spawn(Purpose::Prediction, move |ticket| async move {
            fast_page.commit(ticket, text("fast"))
        });

        assert!(fast.await.unwrap());
        assert!(slow.await.unwrap_err().is_cancelled());
        assert_eq!(page.content(Purpose::Prediction).as_deref(), Some("fast"));
    }

    #[test]
    fn test_superseded_ticket_cannot_clear_loading() {
        let page = Page::new("Test");
        let stale = page.begin(Purpose::Prediction);
        assert!(page.set_loading(stale, true));

        let fresh = page.begin(Purpose::Prediction);
        assert!(page.set_loading(fresh, true));
        assert!(!page.set_loading(stale, false));
        assert!(page.is_loading());

        assert!(page.set_loading(fresh, false));
        assert!(!page.is_loading());
    }

    #[tokio::test]
    async fn test_latest_spawn_keeps_running_when_spawned_from_many_threads() {
        let page = Arc::new(Page::new("Test"));
        let runtime = tokio::runtime::Handle::current();
        let mut spawners = Vec::new();
        for _ in 0..8 {
            let page = Arc::clone(&page);
            let runtime = runtime.clone();
            spawners.push(std::thread::spawn(move || {
                let _entered = runtime.enter();
                let task_page = Arc::clone(&page);
                page.spawn(Purpose::Comparison, move |ticket| async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    task_page.commit(ticket, text("done"))
                })
            }));
        }
        let handles: Vec<_> = spawners.into_iter().map(|t| t.join().unwrap()).collect();

        let mut finished = 0;
        for handle in handles {
            if let Ok(committed) = handle.await {
                assert!(committed);
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(page.content(Purpose::Comparison).as_deref(), Some("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_removed_after_duration() {
        let page = Page::new("Test");
        let removal = page.pulse(Duration::from_millis(1000));
        assert!(page.is_pulsing());

        removal.await.unwrap();
        assert!(!page.is_pulsing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_pulse_does_not_cut_newer_one_short() {
        let page = Page::new("Test");
        let first = page.pulse(Duration::from_millis(1000));
        tokio::time::sleep(Duration::from_millis(600)).await;
        let second = page.pulse(Duration::from_millis(1000));

        first.await.unwrap();
        assert!(page.is_pulsing());

        second.await.unwrap();
        assert!(!page.is_pulsing());
    }

    #[test]
    fn test_document_places_content_in_containers() {
        let page = Page::new("Disease <PredictionIQ>");
        let ticket = page.begin(Purpose::Comparison);
        page.commit(ticket, div().class("comparison-stats").into());
        assert!(page.set_loading(ticket, true));

        let html = page.render_document().to_string();
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
        assert!(html.contains("<title>Disease &lt;PredictionIQ&gt;</title>"));
        assert!(html.contains(
            r#"<div id="comparisonContent"><div class="comparison-stats"></div></div>"#
        ));
        assert!(html.contains(r#"<div id="modelInfoContent"></div>"#));
        assert!(html.contains(r#"class="loading-overlay active""#));
        assert!(!html.contains(PULSE_CLASS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_marks_pulsing_results_card() {
        let page = Page::new("Test");
        let _removal = page.pulse(Duration::from_millis(1000));
        let html = page.render_document().to_string();
        assert!(html.contains(r#"class="results-card animate__animated animate__pulse""#));
    }
}
