use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rand::{Rng, SeedableRng};

use openstatus_core::features::ALL_COLUMNS;
use openstatus_core::{DatasetError, DatasetShape};
use openstatus_ml::{Classifier, LogisticRegression, ModelKind, ModelResult};
use openstatus_runner::{CompetitionRunner, RunnerError};

const TRAIN_ROWS: usize = 90;
const TEST_ROWS: usize = 25;

/// Writes competition-shaped train/test files; the test file has no `OpenStatus`.
fn write_fixture(dir: &Path, train_rows: usize, test_rows: usize) -> (PathBuf, PathBuf) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x0C105ED);
    let train_path = dir.join("train.csv");
    let test_path = dir.join("test.csv");

    let mut train = File::create(&train_path).unwrap();
    writeln!(train, "Id,{}", ALL_COLUMNS.join(",")).unwrap();
    for row in 0..train_rows {
        let open = row % 3 != 0;
        let reputation: u32 = if open {
            rng.gen_range(200..5_000)
        } else {
            rng.gen_range(1..150)
        };
        writeln!(
            train,
            "{row},{post},2012-01-01,{owner},2011-05-05,{reputation},{answers},\"Title, {row}\",\"body\nline\",rust,,,,,{closed},{label}",
            post = 1_000 + row,
            owner = rng.gen_range(1..100_000),
            answers = rng.gen_range(0..40),
            closed = if open { "" } else { "2012-02-02" },
            label = u8::from(open),
        )
        .unwrap();
    }

    let mut test = File::create(&test_path).unwrap();
    let test_columns: Vec<&str> = ALL_COLUMNS
        .iter()
        .copied()
        .filter(|&name| name != "OpenStatus")
        .collect();
    writeln!(test, "Id,{}", test_columns.join(",")).unwrap();
    for row in 0..test_rows {
        writeln!(
            test,
            "{id},{post},2012-03-03,{owner},2011-05-05,{reputation},{answers},Title,body,go,,,,,",
            id = 50_000 + row,
            post = 9_000 + row,
            owner = rng.gen_range(1..100_000),
            reputation = if row % 2 == 0 { 4_000 } else { 3 },
            answers = rng.gen_range(0..40),
        )
        .unwrap();
    }

    (train_path, test_path)
}

#[derive(Debug, Clone)]
struct RecordingClassifier {
    inner: LogisticRegression,
    fitted_rows: Rc<RefCell<Vec<usize>>>,
}

impl Classifier for RecordingClassifier {
    fn name(&self) -> &'static str {
        "Recording"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        assert!(y.iter().all(|label| !label.is_nan()));
        self.fitted_rows.borrow_mut().push(x.len());
        self.inner.fit(x, y)
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.inner.predict_proba(x)
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

fn read_submission(path: &Path) -> Vec<(String, f64)> {
    let content = fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id,OpenStatus"));
    lines
        .map(|line| {
            let (id, probability) = line.split_once(',').unwrap();
            (id.to_string(), probability.parse().unwrap())
        })
        .collect()
}

#[test]
fn fits_on_labelled_rows_and_submits_every_test_row() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_fixture(dir.path(), TRAIN_ROWS, TEST_ROWS);
    let runner =
        CompetitionRunner::load(&train, &test, DatasetShape::new(TRAIN_ROWS, TEST_ROWS, 15))
            .unwrap();
    assert_eq!(runner.n_train(), TRAIN_ROWS);
    assert_eq!(runner.n_test(), TEST_ROWS);

    let (x, y) = runner.extract_features(runner.data()).unwrap();
    assert_eq!(x.len(), TRAIN_ROWS + TEST_ROWS);

    let fitted_rows = Rc::new(RefCell::new(Vec::new()));
    let mut model = RecordingClassifier {
        inner: LogisticRegression::default(),
        fitted_rows: Rc::clone(&fitted_rows),
    };
    let submission_file = dir.path().join("out").join("submission.csv");
    let report = runner
        .make_predictions(&mut model, &x, &y, &submission_file)
        .unwrap();

    // the final fit sees every labelled row, the three folds two thirds each
    assert_eq!(fitted_rows.borrow().as_slice(), &[TRAIN_ROWS, 60, 60, 60]);
    assert_eq!(report.train_samples, TRAIN_ROWS);
    assert_eq!(report.test_samples, TEST_ROWS);
    assert_eq!(report.predictions.len(), TEST_ROWS);
    assert_eq!(report.cv_scores.len(), 3);
    assert!(report.cv_mean() > 0.9, "{:?}", report.cv_scores);

    let rows = read_submission(&submission_file);
    assert_eq!(rows.len(), TEST_ROWS);
    for (index, (id, probability)) in rows.iter().enumerate() {
        assert_eq!(id, &(50_000 + index).to_string());
        assert!((0.0..=1.0).contains(probability));
        assert_eq!(*probability, report.predictions[index]);
    }
    // even rows carry a high reputation and should look open
    assert!(rows[0].1 > rows[1].1);
}

#[test]
fn every_menu_model_produces_a_valid_submission() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_fixture(dir.path(), TRAIN_ROWS, TEST_ROWS);
    for kind in ModelKind::ALL {
        let runner =
            CompetitionRunner::load(&train, &test, DatasetShape::new(TRAIN_ROWS, TEST_ROWS, 15))
                .unwrap()
                .with_model(kind);
        let path = dir.path().join(format!("{kind}.csv"));
        let report = runner.run(&path).unwrap();

        let rows = read_submission(&path);
        assert_eq!(rows.len(), TEST_ROWS, "{kind}");
        assert!(
            rows.iter().all(|(_, p)| (0.0..=1.0).contains(p)),
            "{kind}: {:?}",
            report.predictions
        );
    }
}

#[test]
fn wrong_fingerprint_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_fixture(dir.path(), 12, 4);

    let err = CompetitionRunner::load(&train, &test, DatasetShape::COMPETITION).unwrap_err();
    let dataset_err = err.downcast_ref::<DatasetError>().unwrap();
    assert!(matches!(
        dataset_err,
        DatasetError::WrongDatasets { found, .. } if *found == DatasetShape::new(12, 4, 15)
    ));
    assert!(err.to_string().contains("loaded the wrong datasets"));
}

#[test]
fn labelled_test_row_is_reported_as_lost() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_fixture(dir.path(), 12, 4);
    let runner = CompetitionRunner::load(&train, &test, DatasetShape::new(12, 4, 15)).unwrap();

    let (x, mut y) = runner.extract_features(runner.data()).unwrap();
    let last = y.len() - 1;
    y[last] = 1.0;
    let mut model = runner.setup_model();
    let err = runner
        .make_predictions(model.as_mut(), &x, &y, &dir.path().join("never.csv"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunnerError>(),
        Some(RunnerError::LostTestSamples {
            expected: 4,
            found: 3
        })
    ));
    assert!(!dir.path().join("never.csv").exists());
}

#[test]
fn overflowing_cells_are_treated_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = write_fixture(dir.path(), TRAIN_ROWS, TEST_ROWS);

    // first record: Id,PostId,PostCreationDate,OwnerUserId,OwnerCreationDate,ReputationAtPostCreation,...
    let content = fs::read_to_string(&train).unwrap();
    let (header, rest) = content.split_once('\n').unwrap();
    let mut fields: Vec<&str> = rest.splitn(7, ',').collect();
    fields[5] = "1e400";
    fs::write(&train, format!("{header}\n{}", fields.join(","))).unwrap();

    for kind in ModelKind::ALL {
        let runner =
            CompetitionRunner::load(&train, &test, DatasetShape::new(TRAIN_ROWS, TEST_ROWS, 15))
                .unwrap()
                .with_model(kind);
        let path = dir.path().join(format!("overflow-{kind}.csv"));
        let report = runner.run(&path).unwrap();
        assert!(
            report.predictions.iter().all(|p| (0.0..=1.0).contains(p)),
            "{kind}: {:?}",
            report.predictions
        );
        assert!(read_submission(&path)
            .iter()
            .all(|(_, p)| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn submission_names_carry_the_run_timestamp() {
    let dir = Path::new("data");
    let path = openstatus_core::submission::submission_path(dir, openstatus_core::submission::now())
        .unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();

    let stamp = name
        .strip_prefix("submission_")
        .and_then(|rest| rest.strip_suffix(".csv"))
        .unwrap();
    let (date, clock) = stamp.split_once('_').unwrap();
    assert_eq!(date.len(), 6);
    assert_eq!(clock.len(), 6);
    assert!(date.chars().chain(clock.chars()).all(|c| c.is_ascii_digit()));
    assert_eq!(path.parent(), Some(dir));
}
