/*!

# Instrumented Builds and Their Fallbacks

Solutions are usually compiled with sanitizers so that memory errors show
up as crashes instead of silently matching outputs. Sanitizers are slow and
hungry, which makes instrumented builds trip time and memory limits that
the real solution would meet.

Every [`Candidate`][crate::Candidate] can therefore carry a fallback: the
same program built without instrumentation. When the instrumented build
exceeds a limit, the [`Runner`][crate::Runner] re-measures the fallback on
the same input and warns with both measurements, or reassures that the
overage came from instrumentation. The output that gets compared is always
the instrumented build's.

The fallback of `sol` is found by suffix (`sol.nosan` by default, see
[`Candidate::discover_fallback`][crate::Candidate::discover_fallback]), or
built alongside it by a [`Compile`][crate::Compile] implementation.

## Skipping instrumentation

A candidate written as `brute@nosan` is trusted not to need sanitizers, for
example a slow reference solution. It is run through its fallback build
without any measurement, and that build's output is what gets compared.

 */
