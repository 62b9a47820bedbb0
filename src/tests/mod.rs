/// End-to-end tests over concrete number fields.
///
/// `fields` provides small rings of integers and ideals with known bases and
/// covolumes. The remaining modules run the witness functions against them
/// and check the returned elements independently of the search.


mod ideal_witness_tests;
