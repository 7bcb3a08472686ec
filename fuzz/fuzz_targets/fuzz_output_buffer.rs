#![no_main]
use arbitrary::Arbitrary;
use demangle_outbuf::{OutputBuffer, ScopedRestore};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op<'a> {
    Append(&'a [u8]),
    Byte(u8),
    Signed(i64),
    Unsigned(u64),
    Prepend(&'a [u8]),
    Insert(u16, &'a [u8]),
    Rewind(u16),
    Open(u8),
    Close(u8),
    /// Runs the nested ops with `gt_is_gt` forced to zero, then checks that
    /// the counter came back.
    Scoped(Vec<Op<'a>>),
}

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    initial: Option<u16>,
    ops: Vec<Op<'a>>,
}

fn run(ob: &mut OutputBuffer, model: &mut Vec<u8>, ops: &[Op<'_>]) {
    for op in ops {
        match op {
            Op::Append(bytes) => {
                ob.push_bytes(bytes);
                model.extend_from_slice(bytes);
            }
            Op::Byte(byte) => {
                ob.push_byte(*byte);
                model.push(*byte);
            }
            Op::Signed(n) => {
                ob.push_i64(*n);
                model.extend_from_slice(n.to_string().as_bytes());
            }
            Op::Unsigned(n) => {
                ob.push_u64(*n);
                model.extend_from_slice(n.to_string().as_bytes());
            }
            Op::Prepend(bytes) => {
                ob.prepend(bytes);
                model.splice(0..0, bytes.iter().copied());
            }
            Op::Insert(pos, bytes) => {
                let pos = usize::from(*pos) % (model.len() + 1);
                ob.insert(pos, bytes);
                model.splice(pos..pos, bytes.iter().copied());
            }
            Op::Rewind(pos) => {
                let pos = usize::from(*pos) % (model.len() + 1);
                ob.set_position(pos);
                model.truncate(pos);
            }
            Op::Open(ch) => {
                ob.open_bracket(*ch);
                model.push(*ch);
            }
            Op::Close(ch) => {
                ob.close_bracket(*ch);
                model.push(*ch);
            }
            Op::Scoped(nested) => {
                let before = ob.gt_is_gt;
                {
                    let mut guard = ScopedRestore::replace(&mut *ob, |ob| &mut ob.gt_is_gt, 0);
                    run(&mut guard, model, nested);
                }
                assert_eq!(ob.gt_is_gt, before);
            }
        }
        assert!(ob.len() <= ob.capacity());
        assert_eq!(ob.as_bytes(), model.as_slice());
    }
}

fuzz_target!(|input: Input<'_>| {
    let mut ob = match input.initial {
        Some(size) => OutputBuffer::from_block(vec![0; usize::from(size)].into_boxed_slice()),
        None => OutputBuffer::new(),
    };
    let mut model = Vec::new();
    run(&mut ob, &mut model, &input.ops);
});
