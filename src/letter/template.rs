use crate::letter::matchers::{ContactInfo, DEFAULT_JOB_TITLE};

pub const MATCHED_FALLBACK: &str = "key analytical and technical skills";
pub const MISSING_FALLBACK: &str = "emerging technologies and methodologies";

pub struct LetterFields<'a> {
    pub job_title: &'a str,
    pub matched: &'a [String],
    pub missing: &'a [String],
    pub contact: &'a ContactInfo,
}

fn term_list(terms: &[String], fallback: &str) -> String {
    if terms.is_empty() {
        fallback.to_string()
    } else {
        terms.join(", ")
    }
}

fn title_phrase(job_title: &str) -> String {
    if job_title == DEFAULT_JOB_TITLE {
        job_title.to_string()
    } else {
        format!("the {} position", job_title)
    }
}

pub fn compose(fields: &LetterFields<'_>) -> String {
    let title = title_phrase(fields.job_title);
    let matched = term_list(fields.matched, MATCHED_FALLBACK);
    let missing = term_list(fields.missing, MISSING_FALLBACK);

    let mut letter = format!(
        "Dear Hiring Manager,\n\
         \n\
         I am writing to apply for {title}. My recent work has given me practical \
         experience with {matched}, and I am confident this foundation would let me \
         contribute to your team from the first week.\n\
         \n\
         I am also eager to grow in the areas your posting highlights, in particular \
         {missing}. I pick up new tools quickly when a project calls for them, and I \
         would bring that same energy to {title}.\n\
         \n\
         Thank you for your time and consideration. I would welcome the opportunity to \
         discuss how my background fits your needs.\n\
         \n\
         Sincerely,\n"
    );

    if let Some(name) = &fields.contact.name {
        letter.push_str(name);
        letter.push('\n');
    }
    if let Some(line) = fields.contact.contact_line() {
        letter.push_str(&line);
        letter.push('\n');
    }

    letter.trim_end().to_string()
}
