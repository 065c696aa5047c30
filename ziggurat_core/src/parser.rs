use crate::Argument;
use crate::Block;
use crate::Call;
use crate::CallArgument;
use crate::For;
use crate::If;
use crate::Include;
use crate::Lookup;
use crate::Macro;
use crate::Node;
use crate::Text;
use crate::ZigguratError;
use crate::ZigguratResult;

/// The number of characters of remaining input quoted in syntax errors.
const FOUND_PREVIEW_LENGTH: usize = 12;

/// Parse template source into its root [`Block`].
///
/// The whole input must be consumed. A block terminator or an unknown
/// directive at the top level is reported as a syntax error.
pub fn parse(source: impl AsRef<str>) -> ZigguratResult<Block> {
	Parser::new(source.as_ref()).parse()
}

/// A recursive-descent parser over a character buffer.
///
/// The cursor is a character offset. Reading past the end yields `None`
/// rather than failing, and the cursor may move beyond the end of the buffer.
#[derive(Debug, Clone)]
pub struct Parser {
	source: Vec<char>,
	cursor: usize,
}

impl Parser {
	pub fn new(source: &str) -> Self {
		Self {
			source: source.chars().collect(),
			cursor: 0,
		}
	}

	/// The current character offset.
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	/// The character at the cursor.
	pub fn current(&self) -> Option<char> {
		self.source.get(self.cursor).copied()
	}

	/// The character one position after the cursor.
	pub fn peek(&self) -> Option<char> {
		self.source.get(self.cursor + 1).copied()
	}

	/// Return the current character and move forward by one.
	pub fn advance(&mut self) -> Option<char> {
		let current = self.current();
		self.cursor += 1;
		current
	}

	/// Consume `literal` character by character, optionally skipping
	/// whitespace first.
	///
	/// On a mismatch the cursor is left at the offending character; already
	/// consumed characters are not given back.
	pub fn expect(&mut self, literal: &str, skip_leading_whitespace: bool) -> ZigguratResult<()> {
		if skip_leading_whitespace {
			self.skip_whitespace();
		}

		for expected in literal.chars() {
			if self.current() == Some(expected) {
				self.advance();
			} else {
				return Err(self.error(format!("`{literal}`")));
			}
		}

		Ok(())
	}

	/// Check whether `literal` starts at the cursor without consuming it.
	pub fn try_match(&mut self, literal: &str) -> bool {
		let save_point = self.cursor;
		let mut matched = true;

		for expected in literal.chars() {
			if self.source.get(self.cursor) == Some(&expected) {
				self.cursor += 1;
			} else {
				matched = false;
				break;
			}
		}

		self.cursor = save_point;
		matched
	}

	pub fn skip_whitespace(&mut self) {
		while self.current().is_some_and(is_whitespace) {
			self.advance();
		}
	}

	/// Consume exactly one `\n` if it is the current character.
	pub fn skip_optional_newline(&mut self) {
		if self.current() == Some('\n') {
			self.advance();
		}
	}

	/// Scan an identifier-like word: an ASCII letter followed by letters,
	/// digits, `_`, `.` or `/`. Returns an empty string when the current
	/// character is not a letter.
	pub fn scan_word(&mut self) -> String {
		let mut word = String::new();

		if !self.current().is_some_and(|ch| ch.is_ascii_alphabetic()) {
			return word;
		}

		while let Some(ch) = self.current() {
			if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '/') {
				word.push(ch);
				self.advance();
			} else {
				break;
			}
		}

		word
	}

	/// Scan a `"` or `'` quoted string and return its contents without the
	/// quotes.
	pub fn scan_quoted_string(&mut self) -> ZigguratResult<String> {
		let start = self.cursor;
		let Some(quote) = self.advance() else {
			return Err(self.error("string literal"));
		};

		let mut value = String::new();
		while let Some(ch) = self.current() {
			if ch == quote {
				break;
			}
			value.push(ch);
			self.advance();
		}

		if self.advance().is_none() {
			return Err(ZigguratError::UnterminatedString {
				quote,
				offset: start,
			});
		}

		Ok(value)
	}

	/// Parse the entire input.
	pub fn parse(&mut self) -> ZigguratResult<Block> {
		let block = self.block()?;

		if self.current().is_some() {
			return Err(self.error("a directive (`@if`, `@for`, `@include` or `@macro`)"));
		}

		Ok(block)
	}

	/// Parse nodes until the end of input or an `@` that does not start a
	/// known directive. Terminators such as `@endif@` are left for the
	/// enclosing construct to consume.
	pub fn block(&mut self) -> ZigguratResult<Block> {
		let mut nodes = vec![];

		while let Some(current) = self.current() {
			let node = if self.try_match("@if ") {
				Node::If(self.if_stmt()?)
			} else if self.try_match("@for ") {
				Node::For(self.for_loop()?)
			} else if self.try_match("@include ") {
				Node::Include(self.include()?)
			} else if self.try_match("@macro ") {
				Node::Macro(self.macro_decl()?)
			} else if current == '{' {
				self.lookup_or_call()?
			} else if current != '@' {
				Node::Text(self.text())
			} else {
				tracing::trace!(offset = self.cursor, "block ends at `@`");
				break;
			};

			nodes.push(node);
		}

		Ok(Block::new(nodes))
	}

	/// ```text
	/// @if name@
	///   Welcome {name}!
	/// @else@
	///   Welcome!
	/// @endif@
	/// ```
	pub fn if_stmt(&mut self) -> ZigguratResult<If> {
		self.expect("@if ", false)?;
		let condition = self.name("condition")?;
		self.expect("@", true)?;
		self.skip_optional_newline();

		let consequence = self.block()?;
		let mut alternative = Block::empty();

		if self.try_match("@else@") {
			self.expect("@else@", false)?;
			self.skip_optional_newline();
			alternative = self.block()?;
		}

		self.expect("@endif@", false)?;
		self.skip_optional_newline();

		Ok(If {
			condition,
			consequence,
			alternative,
		})
	}

	/// ```text
	/// @for item in items@
	///   {item}
	/// @endfor@
	/// ```
	pub fn for_loop(&mut self) -> ZigguratResult<For> {
		self.expect("@for ", false)?;
		let name = self.name("loop variable")?;

		self.expect("in", true)?;
		if !self.current().is_some_and(is_whitespace) {
			return Err(self.error("whitespace after `in`"));
		}
		self.skip_whitespace();
		let iterator = self.name("iterable name")?;

		self.expect("@", true)?;
		self.skip_optional_newline();

		let body = self.block()?;
		self.expect("@endfor@", false)?;
		self.skip_optional_newline();

		Ok(For {
			name,
			iterator,
			body,
		})
	}

	/// `@include path/to/file.txt@`
	pub fn include(&mut self) -> ZigguratResult<Include> {
		self.expect("@include ", false)?;
		let source = self.name("include path")?;
		self.expect("@", true)?;

		Ok(Include { source })
	}

	/// ```text
	/// @macro input(type, value)@
	///   <input type="{type}" value="{value}">
	/// @endmacro@
	/// ```
	pub fn macro_decl(&mut self) -> ZigguratResult<Macro> {
		self.expect("@macro ", false)?;
		let name = self.name("macro name")?;

		self.expect("(", true)?;
		self.skip_whitespace();

		let mut parameters = vec![];
		let first = self.scan_word();
		self.skip_whitespace();

		if !first.is_empty() {
			parameters.push(first);

			while self.current() == Some(',') {
				self.advance();
				self.skip_whitespace();
				parameters.push(self.name("parameter name")?);
				self.skip_whitespace();
			}
		}

		self.expect(")", false)?;
		self.expect("@", true)?;
		self.skip_optional_newline();

		let body = self.block()?;
		self.expect("@endmacro@", false)?;

		Ok(Macro {
			name,
			parameters,
			body,
		})
	}

	/// `{name|transform}` or, when the brace is followed by `!`, a macro call.
	pub fn lookup_or_call(&mut self) -> ZigguratResult<Node> {
		self.expect("{", false)?;
		self.skip_whitespace();

		if self.current() == Some('!') {
			return Ok(Node::Call(self.call_macro()?));
		}

		let path = self.name("name")?;
		self.skip_whitespace();

		let mut transforms = vec![];
		while self.current() == Some('|') {
			self.advance();
			self.skip_whitespace();
			transforms.push(self.name("transform name")?);
			self.skip_whitespace();
		}

		self.expect("}", false)?;

		Ok(Node::Lookup(Lookup { path, transforms }))
	}

	/// `!name arg="literal" other=lookup}` (the opening brace is already
	/// consumed).
	pub fn call_macro(&mut self) -> ZigguratResult<Call> {
		self.expect("!", false)?;
		self.skip_whitespace();
		let name = self.name("macro name")?;
		self.skip_whitespace();

		let mut arguments = vec![];
		while self.current().is_some_and(|ch| ch != '}') {
			let argument = self.name("argument name")?;
			self.expect("=", true)?;
			self.skip_whitespace();

			let value = if matches!(self.current(), Some('"' | '\'')) {
				Argument::Literal(self.scan_quoted_string()?)
			} else {
				Argument::Lookup(Lookup::new(self.name("argument value")?))
			};

			arguments.push(CallArgument::new(argument, value));
			self.skip_whitespace();

			if self.current() == Some(',') {
				self.advance();
				self.skip_whitespace();
			}
		}

		self.expect("}", false)?;

		Ok(Call { name, arguments })
	}

	/// Literal text up to the next `@` or `{`. A backslash before `@`, `{`
	/// or `}` escapes that character and is dropped.
	pub fn text(&mut self) -> Text {
		let mut content = String::new();

		while let Some(ch) = self.current() {
			if matches!(ch, '@' | '{') {
				break;
			}

			if ch == '\\' && matches!(self.peek(), Some('@' | '{' | '}')) {
				self.advance();
			}

			if let Some(ch) = self.advance() {
				content.push(ch);
			}
		}

		Text { content }
	}

	/// Scan a word that must not be empty.
	fn name(&mut self, expected: &str) -> ZigguratResult<String> {
		let word = self.scan_word();

		if word.is_empty() {
			return Err(self.error(expected));
		}

		Ok(word)
	}

	fn error(&self, expected: impl Into<String>) -> ZigguratError {
		ZigguratError::Syntax {
			expected: expected.into(),
			found: self.found(),
			offset: self.cursor,
		}
	}

	/// A short description of the input at the cursor.
	fn found(&self) -> String {
		let Some(rest) = self.source.get(self.cursor..).filter(|rest| !rest.is_empty()) else {
			return "end of input".to_string();
		};

		let preview: String = rest.iter().take(FOUND_PREVIEW_LENGTH).collect();
		if rest.len() > FOUND_PREVIEW_LENGTH {
			format!("{preview:?}...")
		} else {
			format!("{preview:?}")
		}
	}
}

/// Space, tab, newline, carriage return, vertical tab and form feed.
fn is_whitespace(ch: char) -> bool {
	matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0b}' | '\u{0c}')
}
