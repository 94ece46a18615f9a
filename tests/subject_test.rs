// tests/subject_test.rs

mod common;

use cagr_core::parsers::class_table::parse_class_rows_from_html;
use cagr_core::parsers::subject::parse_syllabus_from_html;
use cagr_core::{CagrClient, Result, ScraperError, Semester, aggregate_subject};
use common::{CAGR_URL, FixtureTransport, ok_page, test_config};
use std::sync::Arc;

const SYLLABUS_URL: &str =
    "http://cagr.test/modules/comunidade/cadastroTurmas/ementaDisciplina.xhtml";

#[test]
fn test_aggregate_subject() -> Result<()> {
    let rows = parse_class_rows_from_html(&common::asset("class_table.html"))?;
    let subject = aggregate_subject(rows, "Análise de requisitos".to_string())?;

    assert_eq!(subject.subject_id, "INE5417");
    assert_eq!(subject.name, "Engenharia de Software I");
    assert_eq!(subject.instruction_hours, 90);
    assert_eq!(subject.syllabus, "Análise de requisitos");
    let ids: Vec<&str> = subject.classes.iter().map(|c| c.class_id.as_str()).collect();
    assert_eq!(ids, vec!["04208A", "04208B"]);
    Ok(())
}

#[test]
fn test_aggregate_empty_fails() {
    assert!(matches!(
        aggregate_subject(Vec::new(), String::new()),
        Err(ScraperError::EmptyClassList)
    ));
}

#[test]
fn test_aggregate_rejects_mixed_subjects() -> Result<()> {
    let mut rows = parse_class_rows_from_html(&common::asset("class_table.html"))?;
    rows[1].instruction_hours = 72;

    match aggregate_subject(rows, String::new()) {
        Err(ScraperError::InconsistentSubject {
            field,
            expected,
            found,
        }) => {
            assert_eq!(field, "instruction hours");
            assert_eq!(expected, "90");
            assert_eq!(found, "72");
        }
        other => panic!("expected InconsistentSubject, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_syllabus_page() -> Result<()> {
    let syllabus = parse_syllabus_from_html(&common::asset("syllabus.html"), "ine5417")?;
    assert_eq!(syllabus.subject_id, "INE5417");
    assert_eq!(syllabus.name, "Engenharia de Software I");
    assert!(syllabus.text.starts_with("Análise de requisitos:"));
    assert_eq!(syllabus.text.lines().count(), 2);
    Ok(())
}

/// A class table page for a subject with one class, used for subjects other than INE5417.
fn single_class_table(subject_id: &str) -> String {
    format!(
        r#"<table>
        <tr>
          <th class="rich-table-subheadercell">Código da Disciplina</th>
          <th class="rich-table-subheadercell">Turma</th>
          <th class="rich-table-subheadercell">Nome da disciplina</th>
          <th class="rich-table-subheadercell">Horas Aula</th>
          <th class="rich-table-subheadercell">Vagas Ofertadas</th>
          <th class="rich-table-subheadercell">Alunos Especiais</th>
          <th class="rich-table-subheadercell">Saldo Vagas</th>
          <th class="rich-table-subheadercell">Pedidos sem vaga</th>
          <th class="rich-table-subheadercell">Horários</th>
          <th class="rich-table-subheadercell">Professor</th>
        </tr>
        <tr class="rich-table-row">
          <td>{id}</td><td>01208</td><td>Disciplina {id}</td><td>72</td><td>40</td>
          <td>2</td><td>10</td><td>1</td><td>2.0730-2 / CTC-CTC102</td><td>Docente</td>
        </tr>
        </table>"#,
        id = subject_id
    )
}

fn registry() -> FixtureTransport {
    let transport = FixtureTransport::new();
    transport.page(CAGR_URL, &common::asset("search_page.html"));

    transport.on("POST", CAGR_URL, |req| {
        assert_eq!(req.field("AJAXREQUEST"), Some("_viewRoot"));
        assert_eq!(
            req.field("formBusca:j_id_jsp_1627717467_40"),
            Some("formBusca:j_id_jsp_1627717467_40")
        );
        assert_eq!(req.field("formBusca:selectSemestre"), Some("20172"));

        let body = match req.field("formBusca:codigoDisciplina") {
            Some("INE5417") => common::asset("class_table.html"),
            Some("INE0000") => "<html><body>Nenhuma turma</body></html>".to_string(),
            Some(other) => single_class_table(other),
            None => String::new(),
        };
        ok_page(CAGR_URL, &body)
    });

    transport.on("GET", SYLLABUS_URL, |req| {
        let id = req.param("codigoDisciplina").unwrap_or_default();
        let body = if id == "INE5417" {
            common::asset("syllabus.html")
        } else {
            format!(
                "<html><body><span>{id} - Disciplina {id}</span><table><tr><td>Ementa de {id}</td></tr></table></body></html>",
                id = id
            )
        };
        ok_page(SYLLABUS_URL, &body)
    });

    transport
}

#[tokio::test]
async fn test_subject_lookup_end_to_end() -> Result<()> {
    let transport = registry();
    let client = CagrClient::with_transport(test_config(), Arc::new(transport.clone()));

    let semester = Semester::parse("20172")?;
    let subject = client.subject("ine5417", &semester).await?;

    assert_eq!(subject.subject_id, "INE5417");
    assert_eq!(subject.name, "Engenharia de Software I");
    assert_eq!(subject.instruction_hours, 90);
    assert!(subject.syllabus.starts_with("Análise de requisitos:"));

    assert_eq!(subject.classes.len(), 2);
    let a = &subject.classes[0];
    let b = &subject.classes[1];
    assert_eq!((a.class_id.as_str(), a.offered_vacancies, a.available_vacancies), ("04208A", 24, 3));
    assert_eq!((b.class_id.as_str(), b.offered_vacancies, b.available_vacancies), ("04208B", 22, 0));
    assert_eq!(a.schedule.len(), 2);
    assert_eq!(b.schedule.len(), 2);

    // search page, search POST, syllabus
    let methods: Vec<&str> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET"]);
    assert_eq!(transport.sessions_opened(), 1);
    Ok(())
}

#[tokio::test]
async fn test_subject_without_classes() -> Result<()> {
    let client = CagrClient::with_transport(test_config(), Arc::new(registry()));
    let result = client.subject("INE0000", &Semester::new(2017, 2)).await;
    assert!(matches!(result, Err(ScraperError::EmptyClassList)));
    Ok(())
}

#[tokio::test]
async fn test_subject_without_classes_skips_syllabus() -> Result<()> {
    let transport = FixtureTransport::new();
    transport.page(CAGR_URL, &common::asset("search_page.html"));
    transport.on("POST", CAGR_URL, |_| {
        ok_page(CAGR_URL, "<html><body>Nenhuma turma</body></html>")
    });
    let client = CagrClient::with_transport(test_config(), Arc::new(transport.clone()));

    let result = client.subject("XXX0000", &Semester::new(2017, 2)).await;
    assert!(matches!(result, Err(ScraperError::EmptyClassList)));

    let methods: Vec<&str> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET", "POST"]);
    Ok(())
}

#[tokio::test]
async fn test_subjects_keep_input_order() -> Result<()> {
    let transport = registry();
    let client = CagrClient::with_transport(test_config(), Arc::new(transport.clone()));

    let ids = ["INE5418", "INE5417", "INE0000", "INE5420", "INE5421", "INE5422"];
    let results = client.subjects(&ids, &Semester::new(2017, 2)).await;

    assert_eq!(results.len(), ids.len());
    for (id, result) in ids.iter().zip(&results) {
        match result {
            Ok(subject) => assert_eq!(&subject.subject_id, id),
            Err(ScraperError::EmptyClassList) => assert_eq!(*id, "INE0000"),
            Err(e) => panic!("unexpected error for {}: {}", id, e),
        }
    }
    assert_eq!(results[1].as_ref().unwrap().classes.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().instruction_hours, 72);

    // every lookup gets its own session
    assert_eq!(transport.sessions_opened(), ids.len());
    Ok(())
}

#[tokio::test]
async fn test_semesters() -> Result<()> {
    let client = CagrClient::with_transport(test_config(), Arc::new(registry()));
    let semesters = client.semesters().await?;
    let codes: Vec<String> = semesters.iter().map(|s| s.to_string()).collect();
    assert_eq!(codes, vec!["20181", "20173", "20172"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_page_is_network_error() {
    let client = CagrClient::with_transport(test_config(), Arc::new(FixtureTransport::new()));
    let err = client.syllabus("INE5417").await.unwrap_err();
    assert!(err.is_network());
}
