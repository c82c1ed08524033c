use crate::common::*;

/// A file path template with printf-style positional placeholders.
///
/// Supported placeholders are `%s`, `%d`, `%0Nd` and the `%%` escape. Arguments are
/// consumed in order, for example `(taxonomy_id, sample_name, view_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    text: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Str,
    Int { width: usize },
}

/// A value filled into a placeholder.
#[derive(Debug, Clone, Copy)]
pub enum TemplateArg<'a> {
    Str(&'a str),
    Int(usize),
}

impl PathTemplate {
    /// The number of placeholders in the template.
    pub fn num_args(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| !matches!(segment, Segment::Literal(_)))
            .count()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn render(&self, args: &[TemplateArg<'_>]) -> Result<PathBuf> {
        ensure!(
            args.len() == self.num_args(),
            "template '{}' expects {} arguments, but get {}",
            self.text,
            self.num_args(),
            args.len()
        );

        let mut args = args.iter();
        let mut output = String::with_capacity(self.text.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Str => match args.next() {
                    Some(TemplateArg::Str(text)) => output.push_str(text),
                    Some(TemplateArg::Int(value)) => output.push_str(&value.to_string()),
                    None => unreachable!(),
                },
                &Segment::Int { width } => match args.next() {
                    Some(&TemplateArg::Int(value)) => {
                        output.push_str(&format!("{:0width$}", value, width = width))
                    }
                    Some(TemplateArg::Str(text)) => {
                        bail!(
                            "template '{}' expects an integer, but get '{}'",
                            self.text,
                            text
                        )
                    }
                    None => unreachable!(),
                },
            }
        }

        Ok(PathBuf::from(output))
    }

    /// Render a template of `(taxonomy_id, sample_name)`.
    pub fn sample_path(&self, taxonomy_id: &str, sample_name: &str) -> Result<PathBuf> {
        self.render(&[TemplateArg::Str(taxonomy_id), TemplateArg::Str(sample_name)])
    }

    /// Render a template of `(taxonomy_id, sample_name, view_index)`.
    pub fn view_path(
        &self,
        taxonomy_id: &str,
        sample_name: &str,
        view_index: usize,
    ) -> Result<PathBuf> {
        self.render(&[
            TemplateArg::Str(taxonomy_id),
            TemplateArg::Str(sample_name),
            TemplateArg::Int(view_index),
        ])
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }

            let mut digits = String::new();
            while let Some(&digit) = chars.peek().filter(|ch| ch.is_ascii_digit()) {
                digits.push(digit);
                chars.next();
            }

            let segment = match chars.next() {
                Some('%') if digits.is_empty() => {
                    literal.push('%');
                    continue;
                }
                Some('s') if digits.is_empty() => Segment::Str,
                Some('d') => {
                    let width = if digits.is_empty() {
                        0
                    } else {
                        ensure!(
                            digits.starts_with('0'),
                            "only zero padding is supported in template '{}'",
                            text
                        );
                        digits.parse()?
                    };
                    Segment::Int { width }
                }
                Some(other) => bail!(
                    "invalid placeholder '%{}{}' in template '{}'",
                    digits,
                    other,
                    text
                ),
                None => bail!("unterminated placeholder in template '{}'", text),
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            text: text.to_owned(),
            segments,
        })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Serialize for PathTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for PathTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|err| D::Error::custom(format!("{:?}", err)))
    }
}
