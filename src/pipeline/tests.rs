// 日志管道测试

use crate::builtin::{MemorySink, PrefixMutator, SuffixMutator};
use crate::config::{FilterConfig, MutatorConfig, PipelineConfig, StrategyConfig};
use crate::pipeline::*;
use pipelog_common::{AuxData, aux_data};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn memory_pipeline() -> (Pipeline<MemorySink>, MemorySink) {
    let sink = MemorySink::new();
    (Pipeline::new(sink.clone()), sink)
}

fn shared_memory_pipeline() -> (SharedStrategy, MemorySink) {
    let (pipeline, sink) = memory_pipeline();
    (Arc::new(pipeline), sink)
}

/// 记录被调用次数的过滤器
struct CountingFilter {
    suppress: bool,
    calls: AtomicUsize,
}

impl CountingFilter {
    fn new(suppress: bool) -> Arc<Self> {
        Arc::new(Self {
            suppress,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Filter for CountingFilter {
    fn filter(&self, _message: &str, _aux: &AuxData) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.suppress
    }
}

#[test]
fn test_mutators_compose_in_order() {
    let (pipeline, sink) = memory_pipeline();
    pipeline.add_mutator(mutator_fn(|message, _| format!("{message}A")));
    pipeline.add_mutator(mutator_fn(|message, _| format!("{message}B")));

    assert!(pipeline.log("X", &AuxData::new()));
    assert_eq!(sink.messages(), vec!["XAB"]);
}

#[test]
fn test_mutators_receive_original_aux_data() {
    let (pipeline, sink) = memory_pipeline();
    pipeline.add_mutator(mutator_fn(|message, aux| {
        format!("{}@{}", message, aux.get("host").map(String::as_str).unwrap_or("?"))
    }));
    pipeline.add_mutator(mutator_fn(|message, aux| format!("{} ({} keys)", message, aux.len())));

    let aux = aux_data([("host", "db-1")]);
    pipeline.log("up", &aux);

    assert_eq!(sink.messages(), vec!["up@db-1 (1 keys)"]);
    assert_eq!(sink.records()[0].aux, aux);
}

#[test]
fn test_filters_short_circuit() {
    let (pipeline, sink) = memory_pipeline();
    let f1 = CountingFilter::new(false);
    let f2 = CountingFilter::new(true);
    let f3 = CountingFilter::new(false);
    pipeline.add_filter(f1.clone());
    pipeline.add_filter(f2.clone());
    pipeline.add_filter(f3.clone());

    assert!(!pipeline.log("message", &AuxData::new()));
    assert!(sink.is_empty());
    assert_eq!(f1.calls(), 1);
    assert_eq!(f2.calls(), 1);
    assert_eq!(f3.calls(), 0);
}

#[test]
fn test_filters_see_mutated_message() {
    let (pipeline, sink) = memory_pipeline();
    pipeline.add_mutator(mutator_fn(|message, _| message.replace("secret", "public")));
    pipeline.add_filter(filter_fn(|message, _| message.contains("secret")));

    assert!(pipeline.log("a secret note", &AuxData::new()));
    assert_eq!(sink.messages(), vec!["a public note"]);

    pipeline.clear_mutators();
    pipeline.add_mutator(mutator_fn(|message, _| format!("{message} secret")));
    assert!(!pipeline.log("harmless", &AuxData::new()));
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_empty_chains_are_identity() {
    let (pipeline, sink) = memory_pipeline();

    assert!(pipeline.log("unchanged", &AuxData::new()));
    assert_eq!(sink.messages(), vec!["unchanged"]);
}

#[test]
fn test_delivery_happens_once_per_log() {
    let (pipeline, sink) = memory_pipeline();
    pipeline.log("one", &AuxData::new());
    pipeline.log("two", &AuxData::new());

    assert_eq!(sink.messages(), vec!["one", "two"]);
}

#[test]
fn test_add_mutator_deduplicates_by_identity() {
    let (pipeline, _sink) = memory_pipeline();
    let mutator: SharedMutator = Arc::new(PrefixMutator::new(">"));

    assert!(pipeline.add_mutator(mutator.clone()));
    assert!(!pipeline.add_mutator(mutator.clone()));
    assert_eq!(pipeline.mutators().len(), 1);

    let twin: SharedMutator = Arc::new(PrefixMutator::new(">"));
    assert!(pipeline.add_mutator(twin));
    assert_eq!(pipeline.mutators().len(), 2);
}

#[test]
fn test_remove_mutator() {
    let (pipeline, sink) = memory_pipeline();
    let prefix: SharedMutator = Arc::new(PrefixMutator::new("["));
    let suffix: SharedMutator = Arc::new(SuffixMutator::new("]"));
    pipeline.add_mutator(prefix.clone());
    pipeline.add_mutator(suffix.clone());

    assert!(pipeline.remove_mutator(&prefix));
    assert!(!pipeline.remove_mutator(&prefix));
    pipeline.log("x", &AuxData::new());

    assert_eq!(sink.messages(), vec!["x]"]);
    assert!(same_entry(&pipeline.mutators()[0], &suffix));
}

#[test]
fn test_remove_absent_filter_fails_cleanly() {
    let (pipeline, _sink) = memory_pipeline();
    let registered = filter_fn(|_, _| false);
    let stranger = filter_fn(|_, _| false);
    pipeline.add_filter(registered.clone());

    assert!(!pipeline.remove_filter(&stranger));
    let filters = pipeline.filters();
    assert_eq!(filters.len(), 1);
    assert!(same_entry(&filters[0], &registered));
}

#[test]
fn test_add_filter_deduplicates_by_identity() {
    let (pipeline, _sink) = memory_pipeline();
    let filter = filter_fn(|message, _| message.is_empty());

    assert!(pipeline.add_filter(filter.clone()));
    assert!(!pipeline.add_filter(filter));
    assert_eq!(pipeline.filters().len(), 1);
}

#[test]
fn test_clear_lists() {
    let (pipeline, sink) = memory_pipeline();
    pipeline.add_mutator(mutator_fn(|_, _| "replaced".to_string()));
    pipeline.add_filter(filter_fn(|_, _| true));

    pipeline.clear_mutators();
    pipeline.clear_filters();

    assert!(pipeline.mutators().is_empty());
    assert!(pipeline.filters().is_empty());
    assert!(pipeline.log("original", &AuxData::new()));
    assert_eq!(sink.messages(), vec!["original"]);
}

#[test]
fn test_capability_shared_between_strategies() {
    let (first, first_sink) = memory_pipeline();
    let (second, second_sink) = memory_pipeline();
    let shout = mutator_fn(|message, _| message.to_uppercase());
    first.add_mutator(shout.clone());
    second.add_mutator(shout.clone());

    first.log("a", &AuxData::new());
    second.log("b", &AuxData::new());
    assert!(first.remove_mutator(&shout));
    first.log("c", &AuxData::new());

    assert_eq!(first_sink.messages(), vec!["A", "c"]);
    assert_eq!(second_sink.messages(), vec!["B"]);
}

#[test]
fn test_builder_style_registration() {
    let sink = MemorySink::new();
    let pipeline = Pipeline::named("audit", sink.clone())
        .with_mutator(Arc::new(PrefixMutator::new("audit: ")))
        .with_filter(filter_fn(|message, _| message.ends_with("noise")));

    pipeline.log("login", &AuxData::new());
    pipeline.log("noise", &AuxData::new());

    assert_eq!(pipeline.name(), "audit");
    assert_eq!(sink.messages(), vec!["audit: login"]);
}

#[test]
fn test_logger_starts_empty() {
    assert!(Logger::new().strategies().is_empty());
    assert!(Logger::with_strategies(None::<SharedStrategy>).strategies().is_empty());

    let logger = Logger::with_strategies(None::<SharedStrategy>);
    let (child, _sink) = shared_memory_pipeline();
    assert!(logger.add_strategy(child));
    assert_eq!(logger.strategies().len(), 1);
}

#[test]
fn test_logger_with_initial_strategies() {
    let (a, _) = shared_memory_pipeline();
    let (b, _) = shared_memory_pipeline();

    let logger = Logger::with_strategies(vec![a.clone(), b.clone(), a.clone()]);
    let strategies = logger.strategies();

    assert_eq!(strategies.len(), 2);
    assert!(same_entry(&strategies[0], &a));
    assert!(same_entry(&strategies[1], &b));
}

#[test]
fn test_add_strategy_deduplicates() {
    let logger = Logger::new();
    let (s1, _) = shared_memory_pipeline();
    let (s2, _) = shared_memory_pipeline();

    assert!(logger.add_strategy(s1.clone()));
    assert!(!logger.add_strategy(s1.clone()));
    assert!(logger.add_strategy(s2.clone()));
    assert_eq!(logger.strategies().len(), 2);

    assert!(logger.remove_strategy(&s1));
    assert!(!logger.remove_strategy(&s1));
    assert_eq!(logger.strategies().len(), 1);

    logger.clear_strategies();
    assert!(logger.strategies().is_empty());
}

#[test]
fn test_logger_fan_out_independence() {
    let (quiet, quiet_sink) = shared_memory_pipeline();
    quiet.add_filter(filter_fn(|_, _| true));
    let (loud, loud_sink) = shared_memory_pipeline();

    let logger = Logger::with_strategies([quiet, loud]);

    assert!(logger.log("hello", &AuxData::new()));
    assert!(quiet_sink.is_empty());
    assert_eq!(loud_sink.messages(), vec!["hello"]);
}

#[test]
fn test_logger_result_ignores_children() {
    let (child, sink) = shared_memory_pipeline();
    child.add_filter(filter_fn(|_, _| true));
    let logger = Logger::new().with_strategy(child);

    assert!(logger.log("dropped downstream", &AuxData::new()));
    assert!(sink.is_empty());
    assert!(Logger::new().log("no children", &AuxData::new()));
}

#[test]
fn test_logger_mutates_before_fan_out() {
    let (a, a_sink) = shared_memory_pipeline();
    a.add_mutator(mutator_fn(|message, _| format!("{message}A")));
    let (b, b_sink) = shared_memory_pipeline();
    b.add_mutator(mutator_fn(|message, _| format!("{message}B")));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let logger = Logger::with_strategies([a, b]);
    logger.add_mutator(mutator_fn(move |message, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        format!("log:{message}")
    }));

    logger.log("hi", &AuxData::new());

    assert_eq!(a_sink.messages(), vec!["log:hiA"]);
    assert_eq!(b_sink.messages(), vec!["log:hiB"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_logger_filter_suppresses_all_children() {
    let (child, sink) = shared_memory_pipeline();
    let logger = Logger::new().with_strategy(child);
    logger.add_filter(filter_fn(|message, _| message.starts_with("debug")));

    assert!(!logger.log("debug: noisy", &AuxData::new()));
    assert!(logger.log("info: useful", &AuxData::new()));
    assert_eq!(sink.messages(), vec!["info: useful"]);
}

#[test]
fn test_nested_loggers() {
    let (leaf, leaf_sink) = shared_memory_pipeline();
    leaf.add_mutator(mutator_fn(|message, _| format!("{message}!")));

    let inner = Arc::new(Logger::named("inner").with_strategy(leaf));
    inner.add_mutator(mutator_fn(|message, _| format!("inner:{message}")));

    let outer = Logger::named("outer").with_strategy(inner.clone());
    outer.add_mutator(mutator_fn(|message, _| format!("outer:{message}")));

    let aux = aux_data([("k", "v")]);
    outer.log("msg", &aux);

    assert_eq!(leaf_sink.messages(), vec!["inner:outer:msg!"]);
    assert_eq!(leaf_sink.records()[0].aux, aux);
    assert_eq!(inner.name(), "inner");
}

#[test]
fn test_children_registered_after_attach_take_effect() {
    let (child, sink) = shared_memory_pipeline();
    let logger = Logger::new().with_strategy(child.clone());

    child.add_mutator(mutator_fn(|message, _| format!("late:{message}")));
    logger.log("x", &AuxData::new());

    assert_eq!(sink.messages(), vec!["late:x"]);
}

#[test]
fn test_registration_from_inside_log_does_not_deadlock() {
    let logger = Arc::new(Logger::new());
    let (child, sink) = shared_memory_pipeline();
    logger.add_strategy(child);

    let target = logger.clone();
    logger.add_mutator(mutator_fn(move |message, _| {
        target.clear_strategies();
        message.to_string()
    }));

    logger.log("first", &AuxData::new());
    logger.log("second", &AuxData::new());

    assert_eq!(sink.messages(), Vec::<String>::new());
    assert!(logger.strategies().is_empty());
}

#[test]
fn test_concurrent_logging() {
    let sink = MemorySink::new();
    let logger = Arc::new(Logger::new().with_strategy(Arc::new(Pipeline::new(sink.clone()))));

    let handles: Vec<_> = (0..4)
        .map(|thread| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    logger.log(&format!("{thread}-{i}"), &AuxData::new());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sink.len(), 100);
}

#[test]
fn test_build_from_config() {
    let config = PipelineConfig {
        name: "app".to_string(),
        mutators: vec![MutatorConfig::new("prefix").with_value("app: ")],
        filters: vec![FilterConfig::new("contains").with_value("skip")],
        strategies: vec![
            StrategyConfig {
                name: Some("errors".to_string()),
                level: Some("error".to_string()),
                filters: vec![FilterConfig::new("contains").with_value("ERROR").inverted()],
                ..StrategyConfig::new("tracing")
            },
            StrategyConfig {
                strategies: vec![StrategyConfig::new("stderr")],
                mutators: vec![MutatorConfig::new("uppercase")],
                ..StrategyConfig::new("logger")
            },
        ],
    };

    let logger = PipelineBuilder::build(&config).unwrap();

    assert_eq!(logger.name(), "app");
    assert_eq!(logger.mutators().len(), 1);
    assert_eq!(logger.filters().len(), 1);
    let strategies = logger.strategies();
    assert_eq!(strategies.len(), 2);
    assert_eq!(strategies[0].name(), "errors");
    assert_eq!(strategies[0].filters().len(), 1);
    assert_eq!(strategies[1].name(), "logger");
    assert_eq!(strategies[1].mutators().len(), 1);

    assert!(!logger.log("please skip", &AuxData::new()));
}

#[test]
fn test_build_rejects_unknown_kinds() {
    let error = PipelineBuilder::build_strategy(&StrategyConfig::new("syslog")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "UNKNOWN_KIND");

    let error = PipelineBuilder::build_mutator(&MutatorConfig::new("reverse")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "UNKNOWN_KIND");

    let error = PipelineBuilder::build_filter(&FilterConfig::new("fuzzy")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "UNKNOWN_KIND");
}

#[test]
fn test_build_reports_missing_fields() {
    let error = PipelineBuilder::build_mutator(&MutatorConfig::new("prefix")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "MISSING_FIELD");

    let error = PipelineBuilder::build_filter(&FilterConfig::new("max_length")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "MISSING_FIELD");

    let error = PipelineBuilder::build_filter(&FilterConfig::new("regex").with_pattern("(")).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "INVALID_PATTERN");

    let bad_format = MutatorConfig::new("timestamp").with_value("%Q");
    let error = PipelineBuilder::build_mutator(&bad_format).err().expect("构建应当失败");
    assert_eq!(error.error_code(), "INVALID_PATTERN");

    let mut console = StrategyConfig::new("console");
    console.strategies.push(StrategyConfig::new("stderr"));
    assert!(PipelineBuilder::build_strategy(&console).is_err());
}

#[test]
fn test_built_filters_behave() {
    let aux = aux_data([("source", "health")]);

    let only_errors = PipelineBuilder::build_filter(&FilterConfig::new("contains").with_value("ERROR").inverted()).unwrap();
    assert!(only_errors.filter("INFO ok", &aux));
    assert!(!only_errors.filter("ERROR boom", &aux));

    let health = PipelineBuilder::build_filter(&FilterConfig::new("aux_equals").with_key("source").with_value("health")).unwrap();
    assert!(health.filter("GET /health", &aux));

    let custom = FilterConfig {
        keywords: vec!["credit_card".to_string()],
        ..FilterConfig::new("sensitive")
    };
    let sensitive = PipelineBuilder::build_filter(&custom).unwrap();
    assert!(sensitive.filter("CREDIT_CARD=4111", &aux));
    assert!(!sensitive.filter("password=x", &aux));
}

#[cfg(feature = "file")]
#[test]
fn test_build_file_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.log");
    let config = StrategyConfig {
        path: Some(path.to_string_lossy().into_owned()),
        mutators: vec![MutatorConfig::new("suffix").with_value(";")],
        ..StrategyConfig::new("file")
    };

    let strategy = PipelineBuilder::build_strategy(&config).unwrap();
    assert!(strategy.log("written", &AuxData::new()));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "written;\n");
}

/// 直接实现 `Strategy` 的自定义策略，通过 `chain().run` 投递
struct CollectingStrategy {
    chain: Chain,
    seen: std::sync::Mutex<Vec<String>>,
}

impl Strategy for CollectingStrategy {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn log(&self, message: &str, aux: &AuxData) -> bool {
        self.chain().run(message, aux, |mutated, _| {
            self.seen.lock().unwrap().push(mutated.to_string());
        })
    }

    fn name(&self) -> &str {
        "collecting"
    }
}

#[test]
fn test_custom_strategy_honours_its_chain() {
    let custom = Arc::new(CollectingStrategy {
        chain: Chain::new(),
        seen: std::sync::Mutex::new(Vec::new()),
    });
    custom.add_mutator(Arc::new(PrefixMutator::new("> ")));
    custom.add_filter(filter_fn(|message, _| message.contains("noise")));

    let logger = Logger::new().with_strategy(custom.clone());
    assert!(logger.log("signal", &AuxData::new()));
    assert!(logger.log("noise", &AuxData::new()));

    assert_eq!(*custom.seen.lock().unwrap(), vec!["> signal".to_string()]);
}
