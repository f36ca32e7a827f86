use incident_ingest::{AnalyzeOptions, IngestError, analyze};
use incident_model::{AnalysisIssue, InferredType, SchemaConfig, TargetField};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn run(text: &str) -> incident_model::CsvAnalysis {
    analyze(
        text.as_bytes(),
        &SchemaConfig::incidents(),
        &AnalyzeOptions::default(),
    )
    .expect("analyze")
}

#[test]
fn profiles_a_french_export() {
    let analysis = run(
        "type;lieu;date;lat;lng;victimes;remarque\n\
         Vol;Dakar;05/01/2024;14.6928;-17.4467;1;\n\
         Rixe;Pikine;06/01/2024;14.7545;-17.3903;0;\n\
         Fraude;Thies;07/01/2024;14.7910;-16.9359;2;\n",
    );
    assert_eq!(analysis.delimiter, ';');
    assert!(analysis.has_headers);
    assert_eq!(analysis.total_rows, 3);
    assert_eq!(analysis.encoding, "UTF-8");
    assert_eq!(analysis.preview.len(), 3);

    let mapped: Vec<Option<TargetField>> = analysis
        .columns
        .iter()
        .map(|column| column.suggested_mapping)
        .collect();
    assert_eq!(
        mapped,
        vec![
            Some(TargetField::IncidentType),
            Some(TargetField::Location),
            Some(TargetField::DateOccurred),
            Some(TargetField::Latitude),
            Some(TargetField::Longitude),
            Some(TargetField::VictimCount),
            None,
        ]
    );

    let date = analysis.column("date").unwrap();
    assert_eq!(date.inferred_type, InferredType::Date);
    assert_eq!(date.examples(), ["05/01/2024", "06/01/2024", "07/01/2024"]);
    assert_eq!(
        analysis.column("lat").unwrap().inferred_type,
        InferredType::Coordinates
    );
    assert_eq!(
        analysis.column("victimes").unwrap().inferred_type,
        InferredType::Number
    );

    assert_eq!(
        analysis.issues,
        vec![
            AnalysisIssue::FewRows {
                rows: 3,
                minimum: 10
            },
            AnalysisIssue::EmptyColumns { count: 1 },
        ]
    );
}

#[test]
fn reports_missing_required_fields() {
    let analysis = run("weapon,notes\nknife,x\n");
    assert_eq!(
        analysis.issues[0],
        AnalysisIssue::MissingRequiredFields {
            fields: vec![
                TargetField::IncidentType,
                TargetField::Location,
                TargetField::DateOccurred
            ]
        }
    );
    assert_eq!(
        analysis.issues[0].to_string(),
        "Missing required fields: incident_type, location, date_occurred"
    );
}

#[test]
fn headerless_file_counts_every_row() {
    let analysis = run("Vol,12,2024-01-05\nRixe,3,2024-01-06\n");
    assert!(!analysis.has_headers);
    assert_eq!(analysis.total_rows, 2);
    assert_eq!(analysis.columns[0].name, "column_1");
}

#[test]
fn rejects_empty_and_utf16_input() {
    let schema = SchemaConfig::incidents();
    let options = AnalyzeOptions::default();
    assert!(matches!(
        analyze(b"", &schema, &options),
        Err(IngestError::EmptyInput)
    ));
    assert!(matches!(
        analyze(&[0xFE, 0xFF, 0, b'a'], &schema, &options),
        Err(IngestError::UnsupportedEncoding { .. })
    ));
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn quality_score_is_bounded(
        header in "[a-z_]{1,10}(,[a-z_]{1,10}){0,6}",
        body in proptest::collection::vec("[A-Za-z0-9 .,/-]{0,30}", 0..20)
    ) {
        let text = format!("{header}\n{}", body.join("\n"));
        let schema = SchemaConfig::incidents();
        let options = AnalyzeOptions::default();
        let first = analyze(text.as_bytes(), &schema, &options).expect("analyze");
        prop_assert!((0.0..=100.0).contains(&first.quality_score));
        let second = analyze(text.as_bytes(), &schema, &options).expect("analyze");
        prop_assert_eq!(first, second);
    }
}
