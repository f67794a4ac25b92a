use crate::errors::AdvisorError;

/// The three narrative sections the decision prompt asks the model for.
/// Any subset may come back; a response with none of them is malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNarrative {
    pub assessment: Option<String>,
    pub recommendations: Option<String>,
    pub outlook: Option<String>,
}

impl ParsedNarrative {
    pub fn is_complete(&self) -> bool {
        self.assessment.is_some() && self.recommendations.is_some() && self.outlook.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Assessment,
    Recommendations,
    Outlook,
}

/// Parse a free-text model response into its narrative sections.
///
/// Tolerates markdown decoration, numbering, and missing sections; an empty
/// response or one with no recognizable section heading at all fails with
/// `ModelResponse`. Text before the first heading is ignored as preamble.
pub fn parse_narrative(text: &str) -> Result<ParsedNarrative, AdvisorError> {
    if text.trim().is_empty() {
        return Err(AdvisorError::ModelResponse(
            "model returned an empty response".into(),
        ));
    }

    let mut narrative = ParsedNarrative::default();
    let mut current: Option<Section> = None;
    let mut buffer = String::new();

    for line in text.lines() {
        match heading_of(line) {
            Some(section) => {
                flush(&mut narrative, current, &mut buffer);
                current = Some(section);
            }
            None => {
                if current.is_some() {
                    buffer.push_str(line);
                    buffer.push('\n');
                }
            }
        }
    }
    flush(&mut narrative, current, &mut buffer);

    if narrative.assessment.is_none()
        && narrative.recommendations.is_none()
        && narrative.outlook.is_none()
    {
        return Err(AdvisorError::ModelResponse(
            "no recognizable sections in model output".into(),
        ));
    }
    Ok(narrative)
}

fn flush(narrative: &mut ParsedNarrative, section: Option<Section>, buffer: &mut String) {
    let content = buffer.trim().to_string();
    buffer.clear();
    if content.is_empty() {
        return;
    }
    match section {
        Some(Section::Assessment) => narrative.assessment = Some(content),
        Some(Section::Recommendations) => narrative.recommendations = Some(content),
        Some(Section::Outlook) => narrative.outlook = Some(content),
        None => {}
    }
}

/// Detect a section heading, stripping markdown/numbering decoration first.
/// "## 1. PORTFOLIO ASSESSMENT:" and "Recommendations" both match.
fn heading_of(line: &str) -> Option<Section> {
    let stripped: String = line
        .trim()
        .trim_start_matches(['#', '*', '-'])
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')' || c == ' ')
        .trim_end_matches([':', '*', ' '])
        .to_uppercase();

    if stripped.starts_with("PORTFOLIO ASSESSMENT") || stripped == "ASSESSMENT" {
        Some(Section::Assessment)
    } else if stripped.starts_with("ACTIONABLE RECOMMENDATIONS")
        || stripped.starts_with("RECOMMENDATIONS")
    {
        Some(Section::Recommendations)
    } else if stripped.starts_with("MARKET OUTLOOK") || stripped == "OUTLOOK" {
        Some(Section::Outlook)
    } else {
        None
    }
}
