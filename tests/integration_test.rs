// Integration tests for casebase
use casebase::{
    CaseBase, CaseId, ConfigError, CorpusLoader, FeatureSchema, Record, RetrieverConfig, ValidationError,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::io::Write;

const MAKES: [(&str, [&str; 3]); 3] = [
    ("Ford", ["Fiesta", "Focus", "Mondeo"]),
    ("BMW", ["M5", "X3", "Z4"]),
    ("Toyota", ["Yaris", "Prius", "RAV4"]),
];
const FUELS: [&str; 3] = ["Petrol", "Diesel", "Hybrid"];

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn car(make: &str, model: &str, fuel: &str, engine: f64, year: i64, mileage: i64, price: f64) -> Record {
    record(json!({
        "Manufacturer": make, "Model": model, "Fuel type": fuel,
        "Engine size": engine, "Year of manufacture": year, "Mileage": mileage, "Price": price
    }))
}

fn query(make: &str, model: &str, fuel: &str, engine: f64, year: i64, mileage: i64) -> Record {
    let mut row = car(make, model, fuel, engine, year, mileage, 0.0);
    row.remove("Price");
    row
}

fn fleet(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let (make, models) = MAKES[i % 3];
            car(
                make,
                models[(i / 3) % 3],
                FUELS[(i / 2) % 3],
                1.0 + (i % 7) as f64 * 0.2,
                1995 + (i % 25) as i64,
                (i * 7919 % 200_000) as i64,
                2_000.0 + (i * 37 % 40) as f64 * 500.0,
            )
        })
        .collect()
}

fn fit(rows: Vec<Record>, config: RetrieverConfig) -> CaseBase {
    CaseBase::from_records(FeatureSchema::car_sales(), rows, config).unwrap()
}

#[test]
fn test_two_ford_scenario() {
    let base = fit(
        vec![
            car("Ford", "Fiesta", "Petrol", 1.0, 2017, 30000, 8000.0),
            car("Ford", "Focus", "Diesel", 1.6, 2018, 20000, 11000.0),
        ],
        RetrieverConfig::default(),
    );

    let retrieval = base
        .retrieve(&query("Ford", "Fiesta", "Petrol", 1.0, 2017, 30000), Some(1))
        .unwrap();

    assert_eq!(retrieval.cases.len(), 1);
    assert_eq!(retrieval.cases[0].case.id, CaseId(0));
    assert_eq!(retrieval.cases[0].distance, 0.0);
    assert_eq!(retrieval.estimate.value(), Some(8000.0));
}

#[test]
fn test_result_bounded_by_k_and_candidates() {
    let base = fit(fleet(90), RetrieverConfig::default());
    let q = query("BMW", "X3", "Diesel", 2.0, 2010, 50000);

    for k in [1, 5, 10, 29, 30, 31, 100] {
        let retrieval = base.retrieve(&q, Some(k)).unwrap();
        assert!(retrieval.cases.len() <= k);
        assert_eq!(retrieval.cases.len(), k.min(retrieval.candidates_count));
        assert!(retrieval.cases.iter().all(|c| c.case.features.category(0) == Some("BMW")));
    }

    // k beyond the filtered set returns the whole filtered set
    let all = base.retrieve(&q, Some(1000)).unwrap();
    assert_eq!(all.cases.len(), 30);
    let returned: BTreeSet<CaseId> = all.cases.iter().map(|c| c.case.id).collect();
    let bmws: BTreeSet<CaseId> = (0..90).filter(|i| i % 3 == 1).map(CaseId).collect();
    assert_eq!(returned, bmws);
}

#[test]
fn test_distances_non_decreasing_with_stable_ties() {
    let base = fit(fleet(120), RetrieverConfig::unfiltered());
    let retrieval = base
        .retrieve(&query("Toyota", "Prius", "Hybrid", 1.8, 2012, 80000), Some(120))
        .unwrap();

    for pair in retrieval.cases.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
        if pair[0].distance == pair[1].distance {
            assert!(pair[0].case.id < pair[1].case.id);
        }
    }
}

#[test]
fn test_retrieval_is_deterministic() {
    let base = fit(fleet(200), RetrieverConfig::default());
    let q = query("Ford", "Focus", "Petrol", 1.4, 2005, 120000);

    let first = base.retrieve(&q, Some(10)).unwrap();
    for _ in 0..5 {
        let again = base.retrieve(&q, Some(10)).unwrap();
        assert_eq!(first.neighbors().len(), again.neighbors().len());
        for (a, b) in first.neighbors().iter().zip(again.neighbors().iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.distance.to_bits(), b.distance.to_bits());
        }
        assert_eq!(
            first.estimate.value().map(f64::to_bits),
            again.estimate.value().map(f64::to_bits)
        );
    }
}

#[test]
fn test_every_case_finds_itself() {
    let rows = fleet(45);
    let base = fit(rows.clone(), RetrieverConfig::default());

    for (i, row) in rows.iter().enumerate() {
        let mut q = row.clone();
        q.remove("Price");
        let retrieval = base.retrieve(&q, Some(1)).unwrap();
        assert_eq!(retrieval.cases[0].distance, 0.0);
        // an earlier duplicate may win the tie, never a later one
        assert!(retrieval.cases[0].case.id <= CaseId(i));
    }
}

#[test]
fn test_unseen_category_still_ranks() {
    let base = fit(fleet(30), RetrieverConfig::default());
    let retrieval = base
        .retrieve(&query("Ford", "Capri", "Electric", 2.0, 1985, 10000), Some(3))
        .unwrap();

    assert_eq!(retrieval.cases.len(), 3);
    assert!(retrieval.cases.iter().all(|c| c.distance.is_finite()));
    assert!(retrieval.estimate.is_available());
}

#[test]
fn test_constant_attribute_yields_finite_distances() {
    let rows = vec![
        car("Ford", "Fiesta", "Petrol", 1.2, 2010, 40000, 4000.0),
        car("Ford", "Focus", "Petrol", 1.2, 2012, 60000, 5000.0),
        car("Ford", "Mondeo", "Petrol", 1.2, 2014, 80000, 6000.0),
    ];
    let base = fit(rows, RetrieverConfig::default());

    let retrieval = base
        .retrieve(&query("Ford", "Focus", "Petrol", 3.0, 2012, 60000), Some(3))
        .unwrap();
    assert_eq!(retrieval.cases.len(), 3);
    assert!(retrieval.cases.iter().all(|c| c.distance.is_finite()));
    assert_eq!(retrieval.cases[0].case.id, CaseId(1));
    assert_eq!(retrieval.cases[0].distance, 0.0);
}

#[test]
fn test_no_matching_filter_value() {
    let base = fit(fleet(30), RetrieverConfig::default());
    let retrieval = base
        .retrieve(&query("Skoda", "Octavia", "Diesel", 1.9, 2008, 150000), Some(5))
        .unwrap();

    assert!(retrieval.is_empty());
    assert_eq!(retrieval.candidates_count, 0);
    assert!(!retrieval.estimate.is_available());

    let response = serde_json::to_value(retrieval.to_response(base.schema())).unwrap();
    assert_eq!(response["result"], json!([]));
    assert_eq!(response["estimate"], Value::Null);
}

#[test]
fn test_unfiltered_policy_reaches_other_makes() {
    let rows = vec![
        car("Ford", "Fiesta", "Petrol", 1.0, 2010, 90000, 3000.0),
        car("BMW", "Fiesta", "Petrol", 1.2, 2017, 30000, 9000.0),
    ];
    let q = query("Ford", "Fiesta", "Petrol", 1.2, 2017, 30000);

    let filtered = fit(rows.clone(), RetrieverConfig::default());
    let top = filtered.retrieve(&q, Some(1)).unwrap();
    assert_eq!(top.cases[0].case.id, CaseId(0));

    let open = fit(rows, RetrieverConfig::unfiltered());
    let top = open.retrieve(&q, Some(1)).unwrap();
    assert_eq!(top.cases[0].case.id, CaseId(1));
}

#[test]
fn test_invalid_queries_rejected() {
    let base = fit(fleet(9), RetrieverConfig::default());

    let mut missing = query("Ford", "Fiesta", "Petrol", 1.0, 2017, 30000);
    missing.remove("Mileage");
    assert_eq!(
        base.retrieve(&missing, Some(3)).unwrap_err(),
        ValidationError::MissingAttribute("Mileage".to_string())
    );

    let mut wrong = query("Ford", "Fiesta", "Petrol", 1.0, 2017, 30000);
    wrong.insert("Mileage".to_string(), json!("plenty"));
    assert!(matches!(
        base.retrieve(&wrong, Some(3)),
        Err(ValidationError::NotNumeric { .. })
    ));
}

#[test]
fn test_fit_rejects_bad_corpus() {
    let err = CaseBase::from_records(FeatureSchema::car_sales(), Vec::new(), RetrieverConfig::default()).unwrap_err();
    assert_eq!(err, ConfigError::EmptyCorpus);

    let mut rows = fleet(6);
    for row in &mut rows {
        row.remove("Mileage");
    }
    let err = CaseBase::from_records(FeatureSchema::car_sales(), rows, RetrieverConfig::default()).unwrap_err();
    assert_eq!(err, ConfigError::MissingColumn("Mileage".to_string()));

    let config = RetrieverConfig::with_filter("Mileage");
    let err = CaseBase::from_records(FeatureSchema::car_sales(), fleet(6), config).unwrap_err();
    assert_eq!(err, ConfigError::UnknownFilterAttribute("Mileage".to_string()));
}

#[test]
fn test_load_corpus_file_end_to_end() {
    let rows: Vec<Value> = fleet(12).into_iter().map(Value::Object).collect();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&rows).unwrap().as_bytes()).unwrap();

    let base = casebase::open(file.path(), FeatureSchema::car_sales(), RetrieverConfig::default()).unwrap();
    assert_eq!(base.corpus().len(), 12);

    let stored = base.case(CaseId(4)).unwrap();
    assert_eq!(stored["Manufacturer"], json!("BMW"));

    let schema = FeatureSchema::car_sales();
    let loaded = CorpusLoader::new(&schema).load_path(file.path()).unwrap();
    assert_eq!(loaded.len(), 12);
}

#[test]
fn test_options_cascade() {
    let base = fit(fleet(27), RetrieverConfig::default());

    let models = base
        .options("Model", &record(json!({ "Manufacturer": "Toyota" })))
        .unwrap();
    assert_eq!(models, vec![json!("Prius"), json!("RAV4"), json!("Yaris")]);

    let makes = base.options("Manufacturer", &Record::new()).unwrap();
    assert_eq!(makes, vec![json!("BMW"), json!("Ford"), json!("Toyota")]);
}
