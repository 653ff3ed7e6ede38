//! Section scanner for `.chart` files
//!
//! A `.chart` file is a sequence of `[Name]` headers, each followed by a
//! `{ ... }` block. The scanner skips lines until it sees the requested header,
//! then yields every line up to the closing brace.

/// Scanner position relative to the wanted section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingSection,
    InSection,
    Finished,
}

/// Iterator over the body lines of one `.chart` section
pub struct SectionScanner<'a, I> {
    lines: I,
    marker: &'a str,
    state: ScanState,
}

impl<'a, I> SectionScanner<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    /// Scan `lines` for the section whose header line contains `marker`
    pub fn new(lines: I, marker: &'a str) -> Self {
        Self {
            lines,
            marker,
            state: ScanState::SeekingSection,
        }
    }
}

impl<'a, I> Iterator for SectionScanner<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            match self.state {
                ScanState::Finished => return None,
                ScanState::SeekingSection => {
                    let line = self.lines.next()?;
                    if line.contains(self.marker) {
                        self.state = ScanState::InSection;
                    }
                }
                ScanState::InSection => {
                    let Some(line) = self.lines.next() else {
                        self.state = ScanState::Finished;
                        return None;
                    };
                    if line.contains('}') {
                        self.state = ScanState::Finished;
                        return None;
                    }
                    return Some(line);
                }
            }
        }
    }
}

/// Body lines of the section `marker`, empty if the section is missing
pub fn section<'a>(text: &'a str, marker: &'a str) -> SectionScanner<'a, std::str::Lines<'a>> {
    SectionScanner::new(text.lines(), marker)
}
