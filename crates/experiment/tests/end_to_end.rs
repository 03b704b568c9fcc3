use abtest_core::AnalysisConfig;
use abtest_experiment::{
    remove_duplicate_users, AnalysisError, Dataset, ExperimentAnalyzer, RawTable, Record,
    SchemaValidator, CONTROL, TREATMENT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/landing_page.csv");

fn analyzer() -> ExperimentAnalyzer {
    ExperimentAnalyzer::new(AnalysisConfig::default()).expect("default config is valid")
}

#[test]
fn landing_page_fixture_matches_documented_rates() {
    let table = RawTable::from_path(FIXTURE).expect("fixture loads");
    let report = analyzer().analyze(&table).expect("analysis succeeds");

    assert_eq!(report.raw_shape, (1002, 4));
    assert_eq!(report.cleaned_shape, (1000, 4));
    assert_eq!(report.cleaning.duplicate_users, 1);

    let control = report.group_stats[CONTROL];
    let treatment = report.group_stats[TREATMENT];
    assert_eq!((control.successes, control.count), (45, 500));
    assert_eq!((treatment.successes, treatment.count), (60, 500));
    assert!((control.conversion_rate - 0.09).abs() < 1e-12);
    assert!((treatment.conversion_rate - 0.12).abs() < 1e-12);

    // pooled p = 0.105, se = sqrt(0.105 * 0.895 * 2/500)
    assert!((report.test.z_statistic - 1.547_337_6).abs() < 1e-6);
    assert!((report.test.p_value - 0.121_781_8).abs() < 1e-5);
    assert!(!report.test.significant);
}

#[test]
fn duplicated_user_with_conflicting_groups_is_dropped() {
    let dataset = Dataset::new(vec![
        Record::new("10", CONTROL, "old_page", false),
        Record::new("dup", CONTROL, "old_page", true),
        Record::new("11", TREATMENT, "new_page", true),
        Record::new("dup", TREATMENT, "new_page", false),
        Record::new("12", TREATMENT, "new_page", false),
    ]);

    let cleaned = remove_duplicate_users(&dataset);

    assert!(cleaned.dataset.iter().all(|r| r.user_id != "dup"));
    assert_eq!(cleaned.dataset.group(CONTROL).count(), 1);
    assert_eq!(cleaned.dataset.group(TREATMENT).count(), 2);
    assert_eq!((cleaned.summary.before, cleaned.summary.after), (5, 3));
}

#[test]
fn schema_error_lists_missing_columns() {
    let table = RawTable::from_reader("user_id,variant,converted\n1,a,1\n".as_bytes()).unwrap();

    match analyzer().analyze(&table) {
        Err(AnalysisError::Schema { missing }) => {
            assert_eq!(missing, vec!["group", "landing_page"]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn group_emptied_by_cleaning_is_an_error() {
    let csv = "user_id,group,landing_page,converted\n\
               1,control,old_page,0\n\
               2,treatment,new_page,1\n\
               2,treatment,new_page,0\n";
    let table = RawTable::from_reader(csv.as_bytes()).unwrap();

    let err = analyzer().analyze(&table).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyGroup { group } if group == TREATMENT));
}

#[test]
fn simulation_on_fixture_reaches_target_and_is_reproducible() {
    let table = RawTable::from_path(FIXTURE).unwrap();
    let analyzer = analyzer();

    let first = analyzer
        .analyze_with_simulation(&table, &mut ChaCha8Rng::seed_from_u64(2024))
        .unwrap();
    let second = analyzer
        .analyze_with_simulation(&table, &mut ChaCha8Rng::seed_from_u64(2024))
        .unwrap();

    let sim = first.simulation.as_ref().expect("simulation ran");
    assert_eq!(sim.treatment_rows, 500);
    assert_eq!(sim.target_successes, 350);
    assert_eq!(sim.rows_flipped, 290);
    assert_eq!(sim.group_stats[TREATMENT].successes, 350);
    assert_eq!(sim.group_stats[CONTROL], first.group_stats[CONTROL]);
    assert!(sim.test.significant);
    assert!(sim.test.z_statistic > first.test.z_statistic);
    assert_eq!(first.simulation, second.simulation);
}

#[test]
fn prepare_then_analyze_agree() {
    let table = RawTable::from_path(FIXTURE).unwrap();
    let analyzer = analyzer();

    let cleaned = analyzer.prepare(&table).unwrap();
    let report = analyzer.analyze(&table).unwrap();

    assert_eq!(cleaned.summary, report.cleaning);
    assert_eq!(
        abtest_experiment::summarize(&cleaned.dataset),
        report.group_stats
    );
}

#[test]
fn unexpected_group_labels_are_described_but_not_tested() {
    let csv = "user_id,group,landing_page,converted\n\
               1,control,old_page,0\n\
               2,control,old_page,1\n\
               3,treatment,new_page,1\n\
               4,treatment,new_page,0\n\
               5,holdout,none,1\n";
    let table = RawTable::from_reader(csv.as_bytes()).unwrap();

    let report = analyzer().analyze(&table).unwrap();

    assert_eq!(report.group_stats.len(), 3);
    assert_eq!(report.group_stats["holdout"].count, 1);
    assert_eq!(report.test.z_statistic, 0.0);
    assert_eq!(report.test.p_value, 1.0);
}

#[test]
fn custom_schema_is_honoured() {
    let config = AnalysisConfig {
        required_columns: ["user_id", "group", "landing_page", "converted", "country"]
            .iter()
            .map(|c| (*c).to_string())
            .collect(),
        ..AnalysisConfig::default()
    };
    let analyzer = ExperimentAnalyzer::new(config).unwrap();
    let table = RawTable::from_path(FIXTURE).unwrap();

    let err = analyzer.analyze(&table).unwrap_err();
    assert!(matches!(err, AnalysisError::Schema { missing } if missing == vec!["country"]));

    let validator = SchemaValidator::default();
    assert!(validator.validate(&table).is_ok());
}
