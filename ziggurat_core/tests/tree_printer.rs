use ziggurat_core::AnyEmptyResult;
use ziggurat_core::parse;
use ziggurat_core::print_tree;

#[test]
fn print_conditional_and_loop() -> AnyEmptyResult {
	let tree = parse(
		"Hello World!\n\n@if name@\nWelcome {name}!\n@else@\nWelcome!\n@endif@\n\n@for i in \
		 numbers@\ni = {i|upper}\n@endfor@",
	)?;

	insta::assert_snapshot!("conditional_and_loop", print_tree(&tree));

	Ok(())
}

#[test]
fn print_macro_and_call() -> AnyEmptyResult {
	let tree = parse(
		"@macro input(type, value)@\n<input type=\"{type}\" value=\"{value}\">\n@endmacro@\n{!input \
		 type='text', value=user.name}",
	)?;

	insta::assert_snapshot!("macro_and_call", print_tree(&tree));

	Ok(())
}

#[test]
fn print_include_and_escapes() -> AnyEmptyResult {
	let tree = parse("server \\{\n@include partials/ssl.conf@\n\\}\n")?;

	insta::assert_snapshot!("include_and_escapes", print_tree(&tree));

	Ok(())
}

#[test]
fn print_empty_template() -> AnyEmptyResult {
	let tree = parse("")?;
	assert_eq!(print_tree(&tree), "Block([\n])");

	Ok(())
}
