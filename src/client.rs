use crate::config::ClientConfig;
use crate::error::{Result, ScraperError};
use crate::models::{
    ForumMember, ProgramCensus, ProgramHeadcount, Semester, Student, Subject, SuspensionReport,
    Syllabus,
};
use crate::parsers;
use crate::parsers::form::Form;
use crate::parsers::forum::MemberList;
use crate::transport::{HttpTransport, Page, Transport};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const LOGIN_FORM_SELECTOR: &str = "#fm1";
const ROOM_SEARCH_FORM_SELECTOR: &str = "form#buscaSala";

/// Entry point to the registry. Everything reachable from here works without logging in;
/// [`CagrClient::login`] hands out a [`Session`] for the rest.
#[derive(Clone)]
pub struct CagrClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl CagrClient {
    /// A client using the default production URLs.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// A client that talks through `transport`. Each lookup and each login runs on
    /// `transport.fresh()`, never on `transport` itself.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Logs in through the central authentication service and returns the session
    /// that authenticated operations run on.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let login_host = host_of(&self.config.login_url)?;
        let transport = self.transport.fresh()?;

        let login_page = transport
            .get(&self.config.login_url, &[("service", self.config.forum_url.as_str())])
            .await?
            .error_for_status()?;

        let mut form = parsers::form::parse_form(&login_page.body, LOGIN_FORM_SELECTOR)?;
        form.set("username", username).set("password", password);

        let response = submit_form(transport.as_ref(), &login_page, &form).await?;
        let rejected = !response.is_success()
            || parsers::form::parse_form(&response.body, LOGIN_FORM_SELECTOR).is_ok();
        if rejected {
            warn!(status = response.status, url = %response.url, "Login rejected");
            return Err(ScraperError::InvalidCredentials);
        }

        info!("Login successful");
        Ok(Session {
            transport,
            config: Arc::clone(&self.config),
            login_host,
        })
    }

    /// Looks up every class of `subject_id` in `semester`, along with its syllabus.
    #[instrument(skip(self, semester), fields(semester = %semester))]
    pub async fn subject(&self, subject_id: &str, semester: &Semester) -> Result<Subject> {
        let subject_id = subject_id.trim().to_uppercase();
        let transport = self.transport.fresh()?;

        let search_page = transport
            .get(&self.config.cagr_url, &[])
            .await?
            .error_for_status()?;
        let submit_id = parsers::catalog::parse_search_button_id(&search_page.body)?;

        let semester_code = semester.format();
        let fields: Vec<(String, String)> = [
            ("AJAXREQUEST", "_viewRoot"),
            ("formBusca", "formBusca"),
            ("javax.faces.ViewState", "j_id1"),
            (submit_id.as_str(), submit_id.as_str()),
            ("formBusca:selectSemestre", semester_code.as_str()),
            ("formBusca:codigoDisciplina", subject_id.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let results = transport
            .post_form(&self.config.cagr_url, &fields)
            .await?
            .error_for_status()?;
        let rows = parsers::class_table::parse_class_rows_from_html(&results.body)?;
        debug!(rows = rows.len(), "Parsed class table");
        if rows.is_empty() {
            return Err(ScraperError::EmptyClassList);
        }

        for row in &rows {
            if row.class.available_vacancies > row.class.offered_vacancies {
                warn!(
                    class_id = %row.class.class_id,
                    offered = row.class.offered_vacancies,
                    available = row.class.available_vacancies,
                    "Registry reports more available than offered vacancies"
                );
            }
        }

        let syllabus = fetch_syllabus(transport.as_ref(), &self.config, &subject_id).await?;
        let subject = parsers::subject::aggregate_subject(rows, syllabus.text)?;

        info!(subject_id = %subject.subject_id, classes = subject.classes.len(), "Fetched subject");
        Ok(subject)
    }

    /// Looks up several subjects concurrently. Results line up with `subject_ids`;
    /// one failed lookup does not affect the others.
    pub async fn subjects<S: AsRef<str>>(
        &self,
        subject_ids: &[S],
        semester: &Semester,
    ) -> Vec<Result<Subject>> {
        let concurrency = self.config.max_concurrent.max(1);

        stream::iter(subject_ids)
            .map(|id| self.subject(id.as_ref(), semester))
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Fetches the syllabus page of a subject.
    pub async fn syllabus(&self, subject_id: &str) -> Result<Syllabus> {
        let transport = self.transport.fresh()?;
        fetch_syllabus(transport.as_ref(), &self.config, subject_id).await
    }

    /// Lists the semesters the class search knows about, newest first as the page orders them.
    pub async fn semesters(&self) -> Result<Vec<Semester>> {
        let transport = self.transport.fresh()?;
        let page = transport
            .get(&self.config.cagr_url, &[])
            .await?
            .error_for_status()?;
        parsers::catalog::parse_semesters_from_html(&page.body)
    }
}

/// A logged-in browsing session. Holding one proves a successful login.
///
/// Every method takes `&mut self`: the session keeps a single cookie store and
/// current page, so requests on it run one at a time.
pub struct Session {
    transport: Box<dyn Transport>,
    config: Arc<ClientConfig>,
    login_host: String,
}

impl Session {
    /// GETs a page, failing with `NotAuthenticated` if the server sends us back to the login page.
    async fn get_page(&mut self, url: &str, query: &[(&str, &str)]) -> Result<Page> {
        let page = self.transport.get(url, query).await?;
        self.check_authenticated(page)
    }

    fn check_authenticated(&self, page: Page) -> Result<Page> {
        if page.url.host_str() == Some(self.login_host.as_str()) {
            warn!(url = %page.url, "Redirected to login, session is no longer valid");
            return Err(ScraperError::NotAuthenticated);
        }
        page.error_for_status()
    }

    /// Parses a student's forum profile.
    #[instrument(skip(self))]
    pub async fn student(&mut self, student_id: &str) -> Result<Student> {
        let url = self.config.forum_page("mostrarPerfil.jsf");
        let page = self
            .get_page(&url, &[("usuarioTipo", "Aluno"), ("usuarioId", student_id)])
            .await?;

        let student = parsers::student::parse_student_profile(&page.body, student_id)?;
        debug!(classes = student.classes.len(), "Parsed student profile");
        Ok(student)
    }

    /// The logged-in student's program code, read from their academic history.
    pub async fn program_id(&mut self) -> Result<String> {
        let url = self.config.history_url.clone();
        let page = self.get_page(&url, &[]).await?;
        parsers::student::parse_program_id_from_html(&page.body)
    }

    async fn member_list(&mut self, room_id: &str) -> Result<MemberList> {
        let url = self.config.forum_page("listarMembros.jsf");
        let page = self.get_page(&url, &[("salaId", room_id)]).await?;
        let list = parsers::forum::parse_member_list(&page.body)?;
        debug!(room_id, members = list.members.len(), "Parsed member list");
        Ok(list)
    }

    /// Everyone in a program's forum room.
    pub async fn forum_members(&mut self, program_id: &str) -> Result<Vec<ForumMember>> {
        let room_id = parsers::forum::forum_program_id(program_id);
        Ok(self.member_list(&room_id).await?.members)
    }

    /// Counts a program's forum members by the semester they entered.
    #[instrument(skip(self))]
    pub async fn students_per_semester(&mut self, program_id: &str) -> Result<ProgramCensus> {
        let room_id = parsers::forum::forum_program_id(program_id);
        let list = self.member_list(&room_id).await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for member in &list.members {
            match parsers::forum::entry_semester(&member.user_id) {
                Some(semester) => *counts.entry(semester).or_default() += 1,
                None => warn!(user_id = %member.user_id, "Member id does not encode a semester"),
            }
        }

        let mut students_per_semester: Vec<(String, usize)> = counts.into_iter().collect();
        students_per_semester.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(ProgramCensus {
            program: list.room_name,
            students_per_semester,
        })
    }

    pub async fn total_students(&mut self, program_id: &str) -> Result<ProgramHeadcount> {
        let room_id = parsers::forum::forum_program_id(program_id);
        let list = self.member_list(&room_id).await?;

        Ok(ProgramHeadcount {
            program: list.room_name,
            students: list.members.len(),
        })
    }

    /// Checks every member of a program's room for a suspended enrollment.
    ///
    /// One profile request per member, issued sequentially on this session.
    #[instrument(skip(self))]
    pub async fn suspended_students(&mut self, program_id: &str) -> Result<SuspensionReport> {
        let room_id = parsers::forum::forum_program_id(program_id);
        let list = self.member_list(&room_id).await?;
        let total = list.members.len();
        let url = self.config.forum_page("mostrarPerfil.jsf");

        let mut suspended = 0;
        for (i, member) in list.members.iter().enumerate() {
            let page = self
                .get_page(
                    &url,
                    &[("usuarioId", member.user_id.as_str()), ("usuarioTipo", "Aluno")],
                )
                .await?;
            if parsers::forum::parse_is_suspended(&page.body)? {
                suspended += 1;
            }
            debug!(processed = i + 1, total, suspended, "Checking enrollment status");
        }

        let percentage = if total == 0 {
            0.0
        } else {
            suspended as f64 / total as f64 * 100.0
        };
        info!(total, suspended, "Finished enrollment status check");

        Ok(SuspensionReport {
            program: list.room_name,
            students: total,
            suspended,
            percentage,
        })
    }

    /// The students in the forum room of one class.
    #[instrument(skip(self, semester), fields(semester = %semester))]
    pub async fn students_from_class(
        &mut self,
        subject_id: &str,
        class_id: &str,
        semester: &Semester,
    ) -> Result<Vec<ForumMember>> {
        let url = self.config.forum_page("formularioBusca.jsf");
        let search_page = self.get_page(&url, &[]).await?;

        let mut form = parsers::form::parse_form(&search_page.body, ROOM_SEARCH_FORM_SELECTOR)?;
        form.set("buscaSala:salaCodigo", &subject_id.to_uppercase())
            .set("buscaSala:salaTurma", class_id)
            .set("buscaSala:salaSemestre", &semester.format())
            .set("buscaSala:j_id_jsp_632900747_29", "disciplinas");

        let results = submit_form(self.transport.as_ref(), &search_page, &form).await?;
        let results = self.check_authenticated(results)?;
        let room_id = parsers::forum::parse_room_id_from_search(&results.body)?;

        let list = self.member_list(&room_id).await?;
        Ok(list
            .members
            .into_iter()
            .filter(ForumMember::is_student)
            .collect())
    }
}

/// Posts `form` to its action, resolved against the page it came from.
async fn submit_form(transport: &dyn Transport, page: &Page, form: &Form) -> Result<Page> {
    let action = page.url.join(&form.action).map_err(|e| {
        ScraperError::ParsingError(format!("bad form action {:?}: {}", form.action, e))
    })?;
    debug!(action = %action, fields = form.fields.len(), "Submitting form");
    transport.post_form(action.as_str(), &form.fields).await
}

async fn fetch_syllabus(
    transport: &dyn Transport,
    config: &ClientConfig,
    subject_id: &str,
) -> Result<Syllabus> {
    let subject_id = subject_id.trim().to_uppercase();
    let url = config.cagr_page("ementaDisciplina.xhtml");
    let page = transport
        .get(&url, &[("codigoDisciplina", subject_id.as_str())])
        .await?
        .error_for_status()?;
    parsers::subject::parse_syllabus_from_html(&page.body, &subject_id)
}

fn host_of(url: &str) -> Result<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| ScraperError::ParsingError(format!("URL has no host: {:?}", url)))
}
